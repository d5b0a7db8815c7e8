//! Computed library totals

use serde::Serialize;
use utoipa::ToSchema;

/// Totals and reports over records, roster and catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LibraryTotals {
    pub total_records: usize,
    /// Books over all records, returned ones included
    pub total_books_borrowed: usize,
    /// Books over records that are not returned
    pub books_on_loan: usize,
    pub total_returned: usize,
    pub total_overdue: usize,
    pub total_borrowers: usize,
    /// Borrowers with at least one record that is not returned
    pub active_borrowers: usize,
    pub total_books: usize,
    pub available_books: usize,
}
