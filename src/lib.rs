//! Circulation Server
//!
//! A REST JSON API for a small lending library: a catalog of books, a roster
//! of borrowers, lending records with an overdue sweep, and a notes store
//! persisted to a JSON file.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
