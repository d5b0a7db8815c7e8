//! Lending service: shared access to the library store

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    library::LibraryStore,
    models::{
        book::{Book, NewBook},
        borrower::{Borrower, BorrowerSummary},
        record::{EditToken, Record, RecordDraft, RecordId, RecordQuery},
        stats::LibraryTotals,
    },
};

#[derive(Clone)]
pub struct LibraryService {
    store: Arc<RwLock<LibraryStore>>,
}

/// Log refused operations at the service boundary
fn refused<T>(operation: &str, result: AppResult<T>) -> AppResult<T> {
    if let Err(e) = &result {
        match e {
            AppError::BorrowerNotFound { name } => {
                tracing::info!("{}: borrower '{}' needs confirmation", operation, name)
            }
            _ => tracing::warn!("{} refused: {}", operation, e),
        }
    }
    result
}

impl LibraryService {
    pub fn new(store: LibraryStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    // Catalog

    pub async fn list_books(&self) -> Vec<Book> {
        self.store.read().await.books().cloned().collect()
    }

    pub async fn add_book(&self, book: NewBook) -> AppResult<Book> {
        let book = refused("Add book", self.store.write().await.add_book(book))?;
        tracing::info!("Book added: {}", book);
        Ok(book)
    }

    pub async fn delete_book(&self, id: &str) -> AppResult<Book> {
        let book = refused("Delete book", self.store.write().await.delete_book(id))?;
        tracing::info!("Book deleted: {}", book);
        Ok(book)
    }

    // Roster

    pub async fn list_borrowers(&self) -> Vec<BorrowerSummary> {
        self.store.read().await.borrower_summaries()
    }

    pub async fn add_borrower(&self, name: &str) -> AppResult<Borrower> {
        let borrower = refused("Add borrower", self.store.write().await.add_borrower(name))?;
        tracing::info!("Borrower added: {}", borrower);
        Ok(borrower)
    }

    pub async fn delete_borrower(&self, serial: &str) -> AppResult<Borrower> {
        let result = self.store.write().await.delete_borrower(serial);
        let borrower = refused("Delete borrower", result)?;
        tracing::info!("Borrower deleted: {}", borrower);
        Ok(borrower)
    }

    // Records

    pub async fn search_records(&self, query: &RecordQuery) -> Vec<Record> {
        self.store.read().await.search(query)
    }

    pub async fn get_record(&self, id: RecordId) -> AppResult<Record> {
        self.store
            .read()
            .await
            .record(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Record with id {} not found", id)))
    }

    pub async fn create_record(&self, draft: RecordDraft) -> AppResult<Record> {
        let record = refused("Create record", self.store.write().await.create_record(draft))?;
        tracing::info!("Record {} created: {}", record.id, record);
        Ok(record)
    }

    /// Open the edit slot and return the token with the current record
    pub async fn begin_edit(&self, id: RecordId) -> AppResult<(EditToken, Record)> {
        let mut store = self.store.write().await;
        let token = refused("Begin edit", store.begin_edit(id))?;
        let record = store
            .record(id)
            .cloned()
            .ok_or_else(|| AppError::Internal(format!("Record {} vanished under edit", id)))?;
        tracing::info!("Editing record {}", id);
        Ok((token, record))
    }

    pub async fn commit_edit(&self, token: EditToken, draft: RecordDraft) -> AppResult<Record> {
        let record = refused("Commit edit", self.store.write().await.commit_edit(token, draft))?;
        tracing::info!("Record {} updated: {}", record.id, record);
        Ok(record)
    }

    pub async fn cancel_edit(&self) -> Option<RecordId> {
        let released = self.store.write().await.cancel_edit();
        if let Some(id) = released {
            tracing::info!("Edit of record {} cancelled", id);
        }
        released
    }

    pub async fn edit_target(&self) -> Option<RecordId> {
        self.store.read().await.edit_target()
    }

    pub async fn delete_record(&self, id: RecordId) -> AppResult<Record> {
        let record = refused("Delete record", self.store.write().await.delete_record(id))?;
        tracing::info!("Record {} deleted", record.id);
        Ok(record)
    }

    pub async fn delete_all_records(&self) -> AppResult<usize> {
        let removed = refused("Delete all records", self.store.write().await.delete_all())?;
        tracing::info!("All records deleted ({})", removed);
        Ok(removed)
    }

    /// Mark borrowed records due before `today` as overdue
    pub async fn sweep_overdue(&self, today: NaiveDate) -> usize {
        let updated = self.store.write().await.sweep_overdue(today);
        if updated > 0 {
            tracing::info!("Overdue sweep marked {} record(s) overdue", updated);
        } else {
            tracing::debug!("Overdue sweep: no changes");
        }
        updated
    }

    pub async fn reset_order(&self) {
        self.store.write().await.reset_order();
        tracing::info!("Record order reset");
    }

    pub async fn totals(&self) -> LibraryTotals {
        self.store.read().await.totals()
    }
}
