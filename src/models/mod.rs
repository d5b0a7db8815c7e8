//! Data models for the circulation server

pub mod book;
pub mod borrower;
pub mod note;
pub mod record;
pub mod stats;

// Re-export commonly used types
pub use book::{Book, BookRef, NewBook};
pub use borrower::{Borrower, BorrowerSummary};
pub use note::{Note, NoteKind, NotesData};
pub use record::{EditToken, Record, RecordDraft, RecordId, RecordQuery, RecordStatus};
pub use stats::LibraryTotals;
