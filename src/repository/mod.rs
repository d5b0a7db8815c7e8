//! Repository layer for persisted data

pub mod notes;

use std::path::PathBuf;

/// Main repository struct holding the storage handles
#[derive(Clone)]
pub struct Repository {
    pub notes: notes::NotesRepository,
}

impl Repository {
    /// Create a new repository storing notes in `notes_file`
    pub fn new(notes_file: impl Into<PathBuf>) -> Self {
        Self {
            notes: notes::NotesRepository::new(notes_file),
        }
    }
}
