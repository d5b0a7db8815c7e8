//! Lending record endpoints

use axum::{extract::State, http::StatusCode, Json};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::AppResult,
    models::record::{EditToken, Record, RecordDraft, RecordId, RecordQuery, RecordStatus},
};

use super::{Path, Query, ValidatedJson};

/// Record fields for creation and edits
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordRequest {
    /// Borrower serial or name
    #[validate(length(max = 100, message = "Borrower must be less than 100 characters"))]
    pub borrower: String,
    /// Create the borrower when the reference does not resolve
    #[serde(default)]
    pub create_borrower: bool,
    /// Book IDs or names
    #[serde(default)]
    pub books: Vec<String>,
    pub borrowed_date: NaiveDate,
    pub return_date: NaiveDate,
    #[serde(default)]
    pub status: RecordStatus,
}

impl From<RecordRequest> for RecordDraft {
    fn from(request: RecordRequest) -> Self {
        Self {
            borrower: request.borrower,
            create_borrower: request.create_borrower,
            books: request.books,
            borrowed_date: request.borrowed_date,
            return_date: request.return_date,
            status: request.status,
        }
    }
}

/// Edit commit request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommitEditRequest {
    pub token: EditToken,
    #[validate(nested)]
    pub record: RecordRequest,
}

/// Open edit session
#[derive(Serialize, ToSchema)]
pub struct EditSession {
    pub token: EditToken,
    pub record: Record,
}

#[derive(Serialize, ToSchema)]
pub struct EditStatus {
    /// Record currently being edited, if any
    pub record_id: Option<RecordId>,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteAllResponse {
    pub deleted: usize,
}

#[derive(Deserialize, IntoParams)]
pub struct SweepQuery {
    /// Reference day (default: today, local time)
    pub today: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct SweepResponse {
    /// Records newly marked overdue
    pub updated: usize,
}

/// Search and sort records
#[utoipa::path(
    get,
    path = "/records",
    tag = "records",
    params(RecordQuery),
    responses(
        (status = 200, description = "Matching records", body = Vec<Record>)
    )
)]
pub async fn list_records(
    State(state): State<crate::AppState>,
    Query(query): Query<RecordQuery>,
) -> Json<Vec<Record>> {
    Json(state.services.library.search_records(&query).await)
}

/// Get a record
#[utoipa::path(
    get,
    path = "/records/{id}",
    tag = "records",
    params(
        ("id" = u64, Path, description = "Record ID")
    ),
    responses(
        (status = 200, description = "Record", body = Record),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_record(
    State(state): State<crate::AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Record>> {
    let record = state.services.library.get_record(RecordId(id)).await?;
    Ok(Json(record))
}

/// Create a record
#[utoipa::path(
    post,
    path = "/records",
    tag = "records",
    request_body = RecordRequest,
    responses(
        (status = 201, description = "Record created", body = Record),
        (status = 400, description = "Invalid dates or book list", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown book, or unknown borrower (code 4: resend with create_borrower)", body = crate::error::ErrorResponse),
        (status = 409, description = "Book unavailable or borrower has overdue books", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_record(
    State(state): State<crate::AppState>,
    ValidatedJson(request): ValidatedJson<RecordRequest>,
) -> AppResult<(StatusCode, Json<Record>)> {
    let record = state.services.library.create_record(request.into()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Delete every record
#[utoipa::path(
    delete,
    path = "/records",
    tag = "records",
    responses(
        (status = 200, description = "Records deleted", body = DeleteAllResponse),
        (status = 409, description = "A record is being edited", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_all_records(
    State(state): State<crate::AppState>,
) -> AppResult<Json<DeleteAllResponse>> {
    let deleted = state.services.library.delete_all_records().await?;
    Ok(Json(DeleteAllResponse { deleted }))
}

/// Delete a record and release its books
#[utoipa::path(
    delete,
    path = "/records/{id}",
    tag = "records",
    params(
        ("id" = u64, Path, description = "Record ID")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse),
        (status = 409, description = "A record is being edited", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_record(
    State(state): State<crate::AppState>,
    Path(id): Path<u64>,
) -> AppResult<StatusCode> {
    state.services.library.delete_record(RecordId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Open the edit session for a record
#[utoipa::path(
    post,
    path = "/records/{id}/edit",
    tag = "records",
    params(
        ("id" = u64, Path, description = "Record ID")
    ),
    responses(
        (status = 200, description = "Edit session opened", body = EditSession),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Another record is being edited", body = crate::error::ErrorResponse)
    )
)]
pub async fn begin_edit(
    State(state): State<crate::AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<EditSession>> {
    let (token, record) = state.services.library.begin_edit(RecordId(id)).await?;
    Ok(Json(EditSession { token, record }))
}

/// Record currently being edited
#[utoipa::path(
    get,
    path = "/records/edit",
    tag = "records",
    responses(
        (status = 200, description = "Edit slot state", body = EditStatus)
    )
)]
pub async fn edit_status(State(state): State<crate::AppState>) -> Json<EditStatus> {
    Json(EditStatus {
        record_id: state.services.library.edit_target().await,
    })
}

/// Commit the open edit session
#[utoipa::path(
    put,
    path = "/records/edit",
    tag = "records",
    request_body = CommitEditRequest,
    responses(
        (status = 200, description = "Record updated", body = Record),
        (status = 400, description = "Invalid dates or book list", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown book or borrower", body = crate::error::ErrorResponse),
        (status = 409, description = "No matching edit session, or book unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn commit_edit(
    State(state): State<crate::AppState>,
    ValidatedJson(request): ValidatedJson<CommitEditRequest>,
) -> AppResult<Json<Record>> {
    let record = state
        .services
        .library
        .commit_edit(request.token, request.record.into())
        .await?;
    Ok(Json(record))
}

/// Cancel the open edit session
#[utoipa::path(
    delete,
    path = "/records/edit",
    tag = "records",
    responses(
        (status = 200, description = "Edit slot released", body = EditStatus)
    )
)]
pub async fn cancel_edit(State(state): State<crate::AppState>) -> Json<EditStatus> {
    Json(EditStatus {
        record_id: state.services.library.cancel_edit().await,
    })
}

/// Mark borrowed records past their return date as overdue
#[utoipa::path(
    post,
    path = "/records/sweep",
    tag = "records",
    params(SweepQuery),
    responses(
        (status = 200, description = "Sweep done", body = SweepResponse)
    )
)]
pub async fn sweep_overdue(
    State(state): State<crate::AppState>,
    Query(query): Query<SweepQuery>,
) -> Json<SweepResponse> {
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    Json(SweepResponse {
        updated: state.services.library.sweep_overdue(today).await,
    })
}

/// Restore the default record order (borrower serial)
#[utoipa::path(
    post,
    path = "/records/reset-order",
    tag = "records",
    responses(
        (status = 204, description = "Order reset")
    )
)]
pub async fn reset_order(State(state): State<crate::AppState>) -> StatusCode {
    state.services.library.reset_order().await;
    StatusCode::NO_CONTENT
}
