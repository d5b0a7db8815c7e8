//! Notes and reminders service

use chrono::Local;
use serde_json::{Map, Value};

use crate::{
    error::AppResult,
    models::note::{CreateNote, Note, NotesListing, ReminderAlert},
    repository::Repository,
};

#[derive(Clone)]
pub struct NotesService {
    repository: Repository,
}

impl NotesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<NotesListing> {
        self.repository.notes.list().await
    }

    pub async fn peek_next_id(&self) -> AppResult<i64> {
        self.repository.notes.peek_next_id().await
    }

    pub async fn get(&self, id: i64) -> AppResult<Note> {
        self.repository.notes.get(id).await
    }

    /// Create a note, or a reminder when a reminder time is given.
    /// Reminder times are local wall-clock times and may not be in the past.
    pub async fn create(&self, new: CreateNote) -> AppResult<Note> {
        let now = Local::now();
        new.check(now.naive_local())?;
        let note = self.repository.notes.create(new, now).await?;
        tracing::info!("Note {} created: {}", note.id, note.title);
        Ok(note)
    }

    pub async fn update(&self, id: i64, patch: &Map<String, Value>) -> AppResult<Note> {
        let note = self.repository.notes.update(id, patch, Local::now()).await?;
        tracing::info!("Note {} updated", note.id);
        Ok(note)
    }

    pub async fn update_many(&self, patches: &[Map<String, Value>]) -> AppResult<Vec<Note>> {
        let notes = self.repository.notes.update_many(patches, Local::now()).await?;
        tracing::info!("Bulk update: {} of {} note(s) updated", notes.len(), patches.len());
        Ok(notes)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let note = self.repository.notes.delete(id).await?;
        tracing::info!("Note {} deleted: {}", note.id, note.title);
        Ok(())
    }

    /// Raise reminder alerts against the local clock
    pub async fn check_reminders(&self) -> AppResult<Vec<ReminderAlert>> {
        let alerts = self
            .repository
            .notes
            .check_reminders(Local::now().naive_local())
            .await?;
        for alert in &alerts {
            tracing::info!(id = alert.id, kind = ?alert.kind, "Reminder: {}", alert.title);
        }
        Ok(alerts)
    }
}
