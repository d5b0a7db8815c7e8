//! Lending record model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::book::BookRef;
use super::borrower::Borrower;

/// Store-assigned record handle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Borrowed,
    Returned,
    Overdue,
}

impl RecordStatus {
    /// Sort precedence: overdue first, returned last
    pub fn precedence(self) -> u8 {
        match self {
            RecordStatus::Overdue => 1,
            RecordStatus::Borrowed => 2,
            RecordStatus::Returned => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Borrowed => "borrowed",
            RecordStatus::Returned => "returned",
            RecordStatus::Overdue => "overdue",
        }
    }

    /// Borrowed and overdue records keep their books on loan
    pub fn is_active(self) -> bool {
        self != RecordStatus::Returned
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One loan: a borrower, the books lent and the date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Record {
    pub id: RecordId,
    pub borrower: Borrower,
    pub books: Vec<BookRef>,
    pub borrowed_date: NaiveDate,
    pub return_date: NaiveDate,
    pub status: RecordStatus,
}

impl Record {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn references_book(&self, book_id: &str) -> bool {
        self.books.iter().any(|b| b.id == book_id)
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.books.iter().map(|b| b.name.as_str()).collect();
        let ids: Vec<&str> = self.books.iter().map(|b| b.id.as_str()).collect();
        write!(
            f,
            "{} borrows [{}] (IDs: {}) on {}, expected return by {}, status: {}",
            self.borrower,
            names.join(", "),
            ids.join(", "),
            self.borrowed_date,
            self.return_date,
            self.status
        )
    }
}

/// Record fields as entered by the user, used for creation and edits
#[derive(Debug, Clone)]
pub struct RecordDraft {
    /// Borrower serial or name
    pub borrower: String,
    /// Caller confirmed creating the borrower if the reference does not resolve
    pub create_borrower: bool,
    /// Book ids or names, in display order
    pub books: Vec<String>,
    pub borrowed_date: NaiveDate,
    pub return_date: NaiveDate,
    pub status: RecordStatus,
}

/// Proof that the holder opened the single edit slot for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EditToken {
    pub record_id: RecordId,
}

/// Sortable record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    BorrowerName,
    BorrowerSerial,
    BorrowedDate,
    ReturnDate,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Record search parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct RecordQuery {
    /// Case-insensitive text matched against borrower serial/name, status, book name/id
    pub q: Option<String>,
    /// Field to sort by; store order is kept when absent
    pub sort: Option<SortField>,
    /// Sort direction (default: asc)
    #[serde(default)]
    pub order: SortDirection,
}
