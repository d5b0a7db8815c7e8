//! Statistics endpoint

use axum::{extract::State, Json};

use crate::models::stats::LibraryTotals;

/// Library totals over records, roster and catalog
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Library totals", body = LibraryTotals)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> Json<LibraryTotals> {
    Json(state.services.library.totals().await)
}
