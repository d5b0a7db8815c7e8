//! Borrower model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Person allowed to borrow books.
///
/// Both fields are fixed at creation, so records hold a copy of the
/// borrower as their reference to the roster entry with the same serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Borrower {
    pub name: String,
    /// `STU-NNN`
    pub serial: String,
}

impl Borrower {
    pub fn new(name: impl Into<String>, serial: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            serial: serial.into(),
        }
    }

    /// A borrower reference is either the exact serial or the name, case-insensitively
    pub fn matches(&self, reference: &str) -> bool {
        self.serial == reference || self.name.to_lowercase() == reference.to_lowercase()
    }
}

impl std::fmt::Display for Borrower {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (Serial: {})", self.name, self.serial)
    }
}

/// Borrower with loan summary for roster listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowerSummary {
    #[serde(flatten)]
    pub borrower: Borrower,
    /// Has a record that is not returned
    pub has_active_loan: bool,
    pub nb_records: usize,
}
