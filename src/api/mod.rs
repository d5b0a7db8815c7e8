//! API handlers for the circulation REST endpoints

pub mod books;
pub mod borrowers;
pub mod health;
pub mod notes;
pub mod openapi;
pub mod records;
pub mod stats;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    routing::{delete, get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use validator::Validate;

use crate::{error::AppError, AppState};

/// JSON body extractor that runs `validator` rules before the handler
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// `axum::extract::Path` answering malformed segments with an `AppError` body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct Path<T>(pub T);

/// `axum::extract::Query` answering malformed parameters with an `AppError` body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct Query<T>(pub T);

/// `axum::Json` answering malformed bodies with an `AppError` body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_dir = state.config.static_files.dir.clone();

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Catalog
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:id", delete(books::delete_book))
        // Roster
        .route("/borrowers", get(borrowers::list_borrowers).post(borrowers::create_borrower))
        .route("/borrowers/:serial", delete(borrowers::delete_borrower))
        // Records
        .route(
            "/records",
            get(records::list_records)
                .post(records::create_record)
                .delete(records::delete_all_records),
        )
        .route(
            "/records/edit",
            get(records::edit_status)
                .put(records::commit_edit)
                .delete(records::cancel_edit),
        )
        .route("/records/sweep", post(records::sweep_overdue))
        .route("/records/reset-order", post(records::reset_order))
        .route("/records/:id", get(records::get_record).delete(records::delete_record))
        .route("/records/:id/edit", post(records::begin_edit))
        // Statistics
        .route("/stats", get(stats::get_stats))
        // Notes & reminders
        .route(
            "/notes",
            get(notes::list_notes)
                .post(notes::create_note)
                .put(notes::update_notes),
        )
        .route("/notes/next-id", get(notes::next_id))
        .route(
            "/notes/:id",
            get(notes::get_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .with_state(state);

    // OpenAPI documentation
    let openapi = openapi::create_openapi_router();

    let mut router = Router::new().nest("/api/v1", api_v1).merge(openapi);

    if let Some(dir) = static_dir {
        tracing::info!("Serving static files from {}", dir);
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
