//! Roster endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::AppResult,
    models::borrower::{Borrower, BorrowerSummary},
};

use super::ValidatedJson;

/// Create borrower request
#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateBorrowerRequest {
    #[validate(length(max = 100, message = "Borrower name must be less than 100 characters"))]
    pub name: String,
}

/// List borrowers with their loan summary
#[utoipa::path(
    get,
    path = "/borrowers",
    tag = "borrowers",
    responses(
        (status = 200, description = "All borrowers", body = Vec<BorrowerSummary>)
    )
)]
pub async fn list_borrowers(State(state): State<crate::AppState>) -> Json<Vec<BorrowerSummary>> {
    Json(state.services.library.list_borrowers().await)
}

/// Add a borrower; the serial is assigned by the server
#[utoipa::path(
    post,
    path = "/borrowers",
    tag = "borrowers",
    request_body = CreateBorrowerRequest,
    responses(
        (status = 201, description = "Borrower added", body = Borrower),
        (status = 400, description = "Blank or duplicate name", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_borrower(
    State(state): State<crate::AppState>,
    ValidatedJson(request): ValidatedJson<CreateBorrowerRequest>,
) -> AppResult<(StatusCode, Json<Borrower>)> {
    let borrower = state.services.library.add_borrower(&request.name).await?;
    Ok((StatusCode::CREATED, Json(borrower)))
}

/// Delete a borrower with no unreturned records
#[utoipa::path(
    delete,
    path = "/borrowers/{serial}",
    tag = "borrowers",
    params(
        ("serial" = String, Path, description = "Borrower serial, e.g. STU-001")
    ),
    responses(
        (status = 204, description = "Borrower deleted"),
        (status = 404, description = "Borrower not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Borrower has books on loan", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_borrower(
    State(state): State<crate::AppState>,
    Path(serial): Path<String>,
) -> AppResult<StatusCode> {
    state.services.library.delete_borrower(&serial).await?;
    Ok(StatusCode::NO_CONTENT)
}
