//! Record search, ordering and totals

use std::cmp::Ordering;

use crate::models::{
    borrower::BorrowerSummary,
    record::{Record, RecordQuery, RecordStatus, SortDirection, SortField},
    stats::LibraryTotals,
};

use super::LibraryStore;

/// Case-insensitive match of `needle` (already lowercased) against the
/// borrower serial and name, the status, and every book name and id
fn record_matches(record: &Record, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

    contains(&record.borrower.serial)
        || contains(&record.borrower.name)
        || contains(record.status.as_str())
        || record
            .books
            .iter()
            .any(|b| contains(&b.name) || contains(&b.id))
}

pub fn compare_records(a: &Record, b: &Record, field: SortField) -> Ordering {
    match field {
        SortField::BorrowerName => a.borrower.name.cmp(&b.borrower.name),
        SortField::BorrowerSerial => a.borrower.serial.cmp(&b.borrower.serial),
        SortField::BorrowedDate => a.borrowed_date.cmp(&b.borrowed_date),
        SortField::ReturnDate => a.return_date.cmp(&b.return_date),
        SortField::Status => a.status.precedence().cmp(&b.status.precedence()),
    }
}

/// Filter then stable-sort. Without a sort field the store order is kept.
pub fn select_records<'a>(records: &'a [Record], query: &RecordQuery) -> Vec<&'a Record> {
    let needle = query
        .q
        .as_deref()
        .map(|q| q.trim().to_lowercase())
        .unwrap_or_default();

    let mut selected: Vec<&Record> = records
        .iter()
        .filter(|r| record_matches(r, &needle))
        .collect();

    if let Some(field) = query.sort {
        selected.sort_by(|a, b| {
            let ordering = compare_records(a, b, field);
            match query.order {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
    }

    selected
}

impl LibraryStore {
    pub fn search(&self, query: &RecordQuery) -> Vec<Record> {
        select_records(self.records(), query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn totals(&self) -> LibraryTotals {
        let records = self.records();
        let count_status =
            |status: RecordStatus| records.iter().filter(|r| r.status == status).count();

        let total_borrowers = self.borrowers().count();
        let active_borrowers = self
            .borrowers()
            .filter(|b| self.borrower_has_active_record(&b.serial))
            .count();

        LibraryTotals {
            total_records: records.len(),
            total_books_borrowed: records.iter().map(|r| r.books.len()).sum(),
            books_on_loan: records
                .iter()
                .filter(|r| r.is_active())
                .map(|r| r.books.len())
                .sum(),
            total_returned: count_status(RecordStatus::Returned),
            total_overdue: count_status(RecordStatus::Overdue),
            total_borrowers,
            active_borrowers,
            total_books: self.books().count(),
            available_books: self.books().filter(|b| b.is_available).count(),
        }
    }

    pub fn borrower_summaries(&self) -> Vec<BorrowerSummary> {
        self.borrowers()
            .map(|b| BorrowerSummary {
                borrower: b.clone(),
                has_active_loan: self.borrower_has_active_record(&b.serial),
                nb_records: self.borrower_record_count(&b.serial),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::store::tests::{date, draft};
    use crate::models::book::NewBook;

    fn populated() -> LibraryStore {
        let mut store = LibraryStore::with_sample_data();
        store
            .create_record(draft(
                "STU-003",
                &["Utopia"],
                "2026-10-02",
                "2026-10-09",
                RecordStatus::Borrowed,
            ))
            .unwrap();
        store
            .create_record(draft(
                "STU-001",
                &["TB-1482", "TP-1532"],
                "2026-10-01",
                "2026-10-20",
                RecordStatus::Returned,
            ))
            .unwrap();
        store
            .create_record(draft(
                "STU-002",
                &["TC-1387"],
                "2026-09-15",
                "2026-09-30",
                RecordStatus::Overdue,
            ))
            .unwrap();
        store
    }

    fn ids(records: &[Record]) -> Vec<u64> {
        records.iter().map(|r| r.id.0).collect()
    }

    fn query(q: Option<&str>, sort: Option<SortField>, order: SortDirection) -> RecordQuery {
        RecordQuery {
            q: q.map(str::to_string),
            sort,
            order,
        }
    }

    #[test]
    fn test_empty_query_matches_all_in_store_order() {
        let store = populated();
        assert_eq!(ids(&store.search(&RecordQuery::default())), vec![1, 2, 3]);
        assert_eq!(
            ids(&store.search(&query(Some("   "), None, SortDirection::Asc))),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_filter_fields() {
        let store = populated();
        let search = |q: &str| ids(&store.search(&query(Some(q), None, SortDirection::Asc)));

        assert_eq!(search("stu-002"), vec![3]);
        assert_eq!(search("ALICE"), vec![2]);
        assert_eq!(search("overdue"), vec![3]);
        assert_eq!(search("prince"), vec![2]);
        assert_eq!(search("tc-13"), vec![3]);
        assert_eq!(search("the"), vec![2, 3]);
        assert!(search("nothing like this").is_empty());
    }

    #[test]
    fn test_sort_by_status_precedence() {
        let store = populated();
        let asc = store.search(&query(None, Some(SortField::Status), SortDirection::Asc));
        let statuses: Vec<RecordStatus> = asc.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![RecordStatus::Overdue, RecordStatus::Borrowed, RecordStatus::Returned]
        );

        let desc = store.search(&query(None, Some(SortField::Status), SortDirection::Desc));
        assert_eq!(ids(&desc), vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_by_dates_is_chronological() {
        let store = populated();
        let by_borrowed = store.search(&query(
            None,
            Some(SortField::BorrowedDate),
            SortDirection::Asc,
        ));
        assert_eq!(ids(&by_borrowed), vec![3, 2, 1]);
        let by_return = store.search(&query(
            None,
            Some(SortField::ReturnDate),
            SortDirection::Desc,
        ));
        assert_eq!(ids(&by_return), vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_by_borrower() {
        let store = populated();
        let by_name = store.search(&query(None, Some(SortField::BorrowerName), SortDirection::Asc));
        assert_eq!(ids(&by_name), vec![2, 3, 1]);
        let by_serial = store.search(&query(
            None,
            Some(SortField::BorrowerSerial),
            SortDirection::Desc,
        ));
        assert_eq!(ids(&by_serial), vec![1, 3, 2]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut store = LibraryStore::with_sample_data();
        for book in ["UT-1516", "TB-1482", "TP-1532"] {
            store
                .create_record(draft(
                    "STU-001",
                    &[book],
                    "2026-10-01",
                    "2026-10-05",
                    RecordStatus::Borrowed,
                ))
                .unwrap();
        }
        let asc = store.search(&query(None, Some(SortField::BorrowerSerial), SortDirection::Asc));
        assert_eq!(ids(&asc), vec![1, 2, 3]);
        let desc = store.search(&query(None, Some(SortField::BorrowerSerial), SortDirection::Desc));
        assert_eq!(ids(&desc), vec![1, 2, 3]);
    }

    #[test]
    fn test_search_does_not_reorder_store() {
        let store = populated();
        store.search(&query(None, Some(SortField::Status), SortDirection::Asc));
        assert_eq!(ids(store.records()), vec![1, 2, 3]);
    }

    #[test]
    fn test_totals() {
        let mut store = populated();
        store
            .add_book(NewBook {
                name: "Le Morte d'Arthur".to_string(),
                author: "Thomas Malory".to_string(),
                year: "1485".to_string(),
            })
            .unwrap();

        let totals = store.totals();
        assert_eq!(
            totals,
            LibraryTotals {
                total_records: 3,
                total_books_borrowed: 4,
                books_on_loan: 2,
                total_returned: 1,
                total_overdue: 1,
                total_borrowers: 3,
                active_borrowers: 2,
                total_books: 6,
                available_books: 4,
            }
        );
    }

    #[test]
    fn test_totals_follow_sweep() {
        let mut store = populated();
        store.sweep_overdue(date("2026-10-18"));
        let totals = store.totals();
        assert_eq!(totals.total_overdue, 2);
        assert_eq!(totals.books_on_loan, 2);
    }

    #[test]
    fn test_borrower_summaries() {
        let store = populated();
        let summaries = store.borrower_summaries();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].borrower.serial, "STU-001");
        assert!(!summaries[0].has_active_loan);
        assert_eq!(summaries[0].nb_records, 1);
        assert!(summaries[1].has_active_loan);
        assert!(summaries[2].has_active_loan);
    }
}
