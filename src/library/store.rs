//! In-memory lending store
//!
//! `LibraryStore` owns the catalog, the roster and the records. It is the
//! only place where book availability changes: after every mutation a book
//! is available iff no borrowed or overdue record lists it.

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookRef, NewBook},
        borrower::Borrower,
        record::{EditToken, Record, RecordDraft, RecordId, RecordStatus},
    },
};

use super::ids::{next_borrower_serial, BookIdSequence};

#[derive(Debug, Clone, Default)]
pub struct LibraryStore {
    /// Keyed by book id, in insertion order
    books: IndexMap<String, Book>,
    /// Keyed by serial, in insertion order
    borrowers: IndexMap<String, Borrower>,
    records: Vec<Record>,
    book_ids: BookIdSequence,
    last_record_id: u64,
    /// Single edit slot
    editing: Option<RecordId>,
}

/// Borrower a record draft resolves to
enum BorrowerChoice {
    Existing(Borrower),
    New(String),
}

fn book_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Book with id {} not found", id))
}

fn borrower_not_found(serial: &str) -> AppError {
    AppError::NotFound(format!("Borrower with serial {} not found", serial))
}

fn record_not_found(id: RecordId) -> AppError {
    AppError::NotFound(format!("Record with id {} not found", id))
}

impl LibraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with the sample catalog and roster
    pub fn with_sample_data() -> Self {
        let mut store = Self::new();

        let books = [
            ("The Barometz", "TB-1482", "Jean Pessante", 1428),
            ("The Canterbury Tales", "TC-1387", "Geoffrey Chaucer", 1387),
            ("The Prince", "TP-1532", "Niccolò Machiavelli", 1532),
            ("Utopia", "UT-1516", "Thomas More", 1516),
            ("Gargantua and Pantagruel", "GP-1532", "François Rabelais", 1532),
        ];
        for (name, id, author, year) in books {
            store
                .books
                .insert(id.to_string(), Book::new(id, name, author, year));
        }

        let borrowers = [
            ("Alice Johnson", "STU-001"),
            ("Bob Smith", "STU-002"),
            ("Charlie Brown", "STU-003"),
        ];
        for (name, serial) in borrowers {
            store
                .borrowers
                .insert(serial.to_string(), Borrower::new(name, serial));
        }

        store
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn books(&self) -> impl Iterator<Item = &Book> + '_ {
        self.books.values()
    }

    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.get(id)
    }

    /// Find a book by id or by case-insensitive name
    pub fn find_book(&self, reference: &str) -> Option<&Book> {
        self.books
            .get(reference)
            .or_else(|| self.books.values().find(|b| b.matches(reference)))
    }

    pub fn borrowers(&self) -> impl Iterator<Item = &Borrower> + '_ {
        self.borrowers.values()
    }

    /// Find a borrower by serial or by case-insensitive name
    pub fn find_borrower(&self, reference: &str) -> Option<&Borrower> {
        self.borrowers
            .get(reference)
            .or_else(|| self.borrowers.values().find(|b| b.matches(reference)))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Record currently holding the edit slot
    pub fn edit_target(&self) -> Option<RecordId> {
        self.editing
    }

    pub fn borrower_record_count(&self, serial: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.borrower.serial == serial)
            .count()
    }

    /// Borrower has a record that is not returned
    pub fn borrower_has_active_record(&self, serial: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.borrower.serial == serial && r.is_active())
    }

    pub fn borrower_has_overdue_record(&self, serial: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.borrower.serial == serial && r.status == RecordStatus::Overdue)
    }

    // -----------------------------------------------------------------------
    // Catalog & roster
    // -----------------------------------------------------------------------

    pub fn add_book(&mut self, new: NewBook) -> AppResult<Book> {
        let name = new.name.trim();
        let author = new.author.trim();
        let year = new.year.trim();

        if name.is_empty() || author.is_empty() || year.is_empty() {
            return Err(AppError::Validation("Please fill in all book fields".to_string()));
        }

        let lowered = name.to_lowercase();
        if self.books.values().any(|b| b.name.to_lowercase() == lowered) {
            return Err(AppError::Validation(format!(
                "A book named '{}' already exists in the records",
                name
            )));
        }

        let year: i32 = year
            .parse()
            .ok()
            .filter(|y| *y >= 0)
            .ok_or_else(|| AppError::Validation(format!("Invalid year: {}", year)))?;

        // Seeded ids may collide with generated ones
        let mut id = self.book_ids.next_id(name);
        while self.books.contains_key(&id) {
            id = self.book_ids.next_id(name);
        }

        let book = Book::new(id.clone(), name, author, year);
        self.books.insert(id, book.clone());
        Ok(book)
    }

    /// Remove a book that is not on loan
    pub fn delete_book(&mut self, id: &str) -> AppResult<Book> {
        let book = self.books.get(id).ok_or_else(|| book_not_found(id))?;
        if !book.is_available {
            return Err(AppError::Conflict(format!(
                "Book {} is currently borrowed and cannot be deleted",
                id
            )));
        }
        self.books.shift_remove(id).ok_or_else(|| book_not_found(id))
    }

    pub fn add_borrower(&mut self, name: &str) -> AppResult<Borrower> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Borrower name cannot be empty".to_string()));
        }

        let lowered = name.to_lowercase();
        if self.borrowers.values().any(|b| b.name.to_lowercase() == lowered) {
            return Err(AppError::Validation(format!(
                "A borrower named '{}' already exists",
                name
            )));
        }

        Ok(self.insert_borrower(name))
    }

    fn insert_borrower(&mut self, name: &str) -> Borrower {
        let serial = next_borrower_serial(self.borrowers.keys().map(String::as_str));
        let borrower = Borrower::new(name, serial.clone());
        self.borrowers.insert(serial, borrower.clone());
        borrower
    }

    /// Remove a borrower whose records are all returned
    pub fn delete_borrower(&mut self, serial: &str) -> AppResult<Borrower> {
        if !self.borrowers.contains_key(serial) {
            return Err(borrower_not_found(serial));
        }
        if self.borrower_has_active_record(serial) {
            return Err(AppError::Conflict(format!(
                "Borrower {} currently has borrowed books and cannot be deleted",
                serial
            )));
        }
        self.borrowers
            .shift_remove(serial)
            .ok_or_else(|| borrower_not_found(serial))
    }

    // -----------------------------------------------------------------------
    // Record lifecycle
    // -----------------------------------------------------------------------

    fn check_draft(draft: &RecordDraft) -> AppResult<()> {
        if draft.books.is_empty() {
            return Err(AppError::Validation(
                "Please add at least one book to the record".to_string(),
            ));
        }
        if draft.return_date <= draft.borrowed_date {
            return Err(AppError::Validation(
                "Expected return date must be after the borrowed date".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve book references for a new record, or for `current` under edit.
    ///
    /// New records take only available books. An edited record keeps the
    /// books it already lists; a book held by another active record is
    /// refused when it is newly listed or when the record stays active.
    fn resolve_books(
        &self,
        references: &[String],
        current: Option<&Record>,
        status: RecordStatus,
    ) -> AppResult<Vec<BookRef>> {
        let mut resolved: Vec<BookRef> = Vec::with_capacity(references.len());

        for reference in references {
            let reference = reference.trim();
            let book = self.find_book(reference).ok_or_else(|| {
                AppError::NotFound(format!("Book '{}' not found in the records", reference))
            })?;

            if resolved.iter().any(|b| b.id == book.id) {
                return Err(AppError::Validation(format!(
                    "Book {} is listed more than once",
                    book.id
                )));
            }

            let blocked = match current {
                None => !book.is_available,
                Some(current) => {
                    let held_elsewhere = self.records.iter().any(|r| {
                        r.id != current.id && r.is_active() && r.references_book(&book.id)
                    });
                    held_elsewhere
                        && (status.is_active() || !current.references_book(&book.id))
                }
            };
            if blocked {
                return Err(AppError::Conflict(format!(
                    "Book '{}' is currently unavailable",
                    book.name
                )));
            }

            resolved.push(book.to_ref());
        }

        Ok(resolved)
    }

    fn resolve_borrower(&self, reference: &str, create: bool) -> AppResult<BorrowerChoice> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(AppError::Validation("Borrower name cannot be empty".to_string()));
        }
        match self.find_borrower(reference) {
            Some(borrower) => Ok(BorrowerChoice::Existing(borrower.clone())),
            None if create => Ok(BorrowerChoice::New(reference.to_string())),
            None => Err(AppError::BorrowerNotFound {
                name: reference.to_string(),
            }),
        }
    }

    fn commit_borrower(&mut self, choice: BorrowerChoice) -> Borrower {
        match choice {
            BorrowerChoice::Existing(borrower) => borrower,
            BorrowerChoice::New(name) => self.insert_borrower(&name),
        }
    }

    /// Recompute availability of the given books from the active records
    fn refresh_availability(&mut self, ids: &[String]) {
        for id in ids {
            let on_loan = self
                .records
                .iter()
                .any(|r| r.is_active() && r.references_book(id));
            if let Some(book) = self.books.get_mut(id) {
                book.is_available = !on_loan;
            }
        }
    }

    /// Create a record. Nothing is mutated unless every check passes.
    pub fn create_record(&mut self, draft: RecordDraft) -> AppResult<Record> {
        Self::check_draft(&draft)?;
        let books = self.resolve_books(&draft.books, None, draft.status)?;
        let choice = self.resolve_borrower(&draft.borrower, draft.create_borrower)?;

        if let BorrowerChoice::Existing(borrower) = &choice {
            if self.borrower_has_overdue_record(&borrower.serial) {
                return Err(AppError::Conflict(format!(
                    "{} has overdue books and cannot borrow new ones until they are returned",
                    borrower.name
                )));
            }
        }

        let borrower = self.commit_borrower(choice);
        self.last_record_id += 1;
        let record = Record {
            id: RecordId(self.last_record_id),
            borrower,
            books,
            borrowed_date: draft.borrowed_date,
            return_date: draft.return_date,
            status: draft.status,
        };

        let ids: Vec<String> = record.books.iter().map(|b| b.id.clone()).collect();
        self.records.push(record.clone());
        self.refresh_availability(&ids);
        Ok(record)
    }

    /// Take the edit slot for `id`. Re-opening the record already being
    /// edited returns the same token.
    pub fn begin_edit(&mut self, id: RecordId) -> AppResult<EditToken> {
        if self.record(id).is_none() {
            return Err(record_not_found(id));
        }
        match self.editing {
            Some(current) if current != id => Err(AppError::Conflict(format!(
                "Record {} is being edited; finish or cancel that edit first",
                current
            ))),
            _ => {
                self.editing = Some(id);
                Ok(EditToken { record_id: id })
            }
        }
    }

    /// Release the edit slot without changes
    pub fn cancel_edit(&mut self) -> Option<RecordId> {
        self.editing.take()
    }

    /// Apply `draft` to the record held by `token` and release the slot.
    /// On failure the record is unchanged and the slot stays held.
    pub fn commit_edit(&mut self, token: EditToken, draft: RecordDraft) -> AppResult<Record> {
        if self.editing != Some(token.record_id) {
            return Err(AppError::Conflict(format!(
                "No edit in progress for record {}",
                token.record_id
            )));
        }
        let index = self
            .records
            .iter()
            .position(|r| r.id == token.record_id)
            .ok_or_else(|| record_not_found(token.record_id))?;
        let current = self.records[index].clone();

        Self::check_draft(&draft)?;
        let books = self.resolve_books(&draft.books, Some(&current), draft.status)?;
        // The saved copy only stands while the roster still holds that borrower
        let enrolled = self
            .borrowers
            .get(&current.borrower.serial)
            .is_some_and(|b| b.name == current.borrower.name);
        let choice = if enrolled && current.borrower.matches(draft.borrower.trim()) {
            BorrowerChoice::Existing(current.borrower.clone())
        } else {
            self.resolve_borrower(&draft.borrower, draft.create_borrower)?
        };
        let borrower = self.commit_borrower(choice);

        let mut touched: Vec<String> = current.books.iter().map(|b| b.id.clone()).collect();
        touched.extend(books.iter().map(|b| b.id.clone()));

        let record = &mut self.records[index];
        record.borrower = borrower;
        record.books = books;
        record.borrowed_date = draft.borrowed_date;
        record.return_date = draft.return_date;
        record.status = draft.status;
        let updated = record.clone();

        self.editing = None;
        self.refresh_availability(&touched);
        Ok(updated)
    }

    /// Delete a record and release its books
    pub fn delete_record(&mut self, id: RecordId) -> AppResult<Record> {
        if self.editing.is_some() {
            return Err(AppError::Conflict(
                "Please finish editing the current record before deleting another".to_string(),
            ));
        }
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| record_not_found(id))?;

        let record = self.records.remove(index);
        let ids: Vec<String> = record.books.iter().map(|b| b.id.clone()).collect();
        self.refresh_availability(&ids);
        Ok(record)
    }

    /// Delete every record and release every book they listed
    pub fn delete_all(&mut self) -> AppResult<usize> {
        if self.editing.is_some() {
            return Err(AppError::Conflict(
                "Please finish editing the current record before deleting records".to_string(),
            ));
        }
        let removed = std::mem::take(&mut self.records);
        let ids: Vec<String> = removed
            .iter()
            .flat_map(|r| r.books.iter().map(|b| b.id.clone()))
            .collect();
        self.refresh_availability(&ids);
        Ok(removed.len())
    }

    /// Mark borrowed records past their return date as overdue.
    /// Returns the number of records changed.
    pub fn sweep_overdue(&mut self, today: NaiveDate) -> usize {
        let mut updated = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|r| r.status == RecordStatus::Borrowed && r.return_date < today)
        {
            record.status = RecordStatus::Overdue;
            updated += 1;
        }
        updated
    }

    /// Restore the default order: borrower serial ascending, stable
    pub fn reset_order(&mut self) {
        self.records
            .sort_by(|a, b| a.borrower.serial.cmp(&b.borrower.serial));
    }
}
