//! Business logic services

pub mod library;
pub mod notes;

use chrono::Local;

use crate::{config::LibraryConfig, library::LibraryStore, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub library: library::LibraryService,
    pub notes: notes::NotesService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, library_config: &LibraryConfig) -> Self {
        let store = if library_config.seed_sample_data {
            LibraryStore::with_sample_data()
        } else {
            LibraryStore::new()
        };

        Self {
            library: library::LibraryService::new(store),
            notes: notes::NotesService::new(repository),
        }
    }

    /// Periodic upkeep: overdue sweep for today and reminder alerts
    pub async fn run_maintenance(&self) {
        self.library.sweep_overdue(Local::now().date_naive()).await;
        if let Err(e) = self.notes.check_reminders().await {
            tracing::error!("Reminder check failed: {}", e);
        }
    }
}
