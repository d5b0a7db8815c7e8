//! Notes repository backed by a JSON data file

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Local, NaiveDateTime};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::note::{CreateNote, Note, NotesData, NotesListing, ReminderAlert},
};

/// Every operation reads the file, applies its change and writes the file
/// back while holding `lock`, so concurrent requests never interleave.
#[derive(Clone)]
pub struct NotesRepository {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl NotesRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file reads as empty data
    async fn load(&self) -> AppResult<NotesData> {
        let text = match tokio::fs::read_to_string(self.path.as_path()).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(NotesData::default()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(NotesData::default());
        }

        let mut data: NotesData = serde_json::from_str(&text)?;
        data.repair_next_id();
        Ok(data)
    }

    async fn save(&self, data: &NotesData) -> AppResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, self.path.as_path()).await?;
        Ok(())
    }

    /// Load, apply `change`, save. Nothing is written when `change` fails.
    async fn modify<T>(
        &self,
        change: impl FnOnce(&mut NotesData) -> AppResult<T>,
    ) -> AppResult<T> {
        let _guard = self.lock.lock().await;
        let mut data = self.load().await?;
        let result = change(&mut data)?;
        self.save(&data).await?;
        Ok(result)
    }

    pub async fn list(&self) -> AppResult<NotesListing> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.listing())
    }

    /// Id the next created entry will get
    pub async fn peek_next_id(&self) -> AppResult<i64> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.next_id)
    }

    pub async fn get(&self, id: i64) -> AppResult<Note> {
        let _guard = self.lock.lock().await;
        self.load()
            .await?
            .find(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Note with id {} not found", id)))
    }

    pub async fn create(&self, new: CreateNote, now: DateTime<Local>) -> AppResult<Note> {
        self.modify(|data| Ok(data.insert(new, now))).await
    }

    pub async fn update(
        &self,
        id: i64,
        patch: &Map<String, Value>,
        now: DateTime<Local>,
    ) -> AppResult<Note> {
        self.modify(|data| data.merge(id, patch, now)).await
    }

    /// Merge each patch into the entry named by its `id` field.
    /// Patches without a known id are skipped; one rejected patch rejects
    /// the whole batch.
    pub async fn update_many(
        &self,
        patches: &[Map<String, Value>],
        now: DateTime<Local>,
    ) -> AppResult<Vec<Note>> {
        self.modify(|data| {
            let mut updated = Vec::new();
            for patch in patches {
                let Some(id) = patch.get("id").and_then(Value::as_i64) else {
                    continue;
                };
                if data.find(id).is_some() {
                    updated.push(data.merge(id, patch, now)?);
                }
            }
            Ok(updated)
        })
        .await
    }

    pub async fn delete(&self, id: i64) -> AppResult<Note> {
        self.modify(|data| {
            data.remove(id)
                .ok_or_else(|| AppError::NotFound(format!("Note with id {} not found", id)))
        })
        .await
    }

    /// Raise due reminder alerts; the file is only rewritten when a flag changed
    pub async fn check_reminders(&self, now: NaiveDateTime) -> AppResult<Vec<ReminderAlert>> {
        let _guard = self.lock.lock().await;
        let mut data = self.load().await?;
        let alerts = data.check_reminders(now);
        if !alerts.is_empty() {
            self.save(&data).await?;
        }
        Ok(alerts)
    }
}
