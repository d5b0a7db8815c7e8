//! Notes and reminders endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::note::{CreateNote, Note, NotesListing},
};

use super::{JsonBody, Path, ValidatedJson};

/// Partial note: any stored field may be given, `id` is ignored on
/// single updates and selects the entry on bulk updates
#[derive(Debug, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct NotePatch(pub Map<String, Value>);

#[derive(Serialize, ToSchema)]
pub struct NextIdResponse {
    #[serde(rename = "nextId")]
    pub next_id: i64,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// List notes and reminders
#[utoipa::path(
    get,
    path = "/notes",
    tag = "notes",
    responses(
        (status = 200, description = "Notes and reminders", body = NotesListing),
        (status = 500, description = "Data file unreadable", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_notes(State(state): State<crate::AppState>) -> AppResult<Json<NotesListing>> {
    Ok(Json(state.services.notes.list().await?))
}

/// Id the next created note will get
#[utoipa::path(
    get,
    path = "/notes/next-id",
    tag = "notes",
    responses(
        (status = 200, description = "Next id", body = NextIdResponse)
    )
)]
pub async fn next_id(State(state): State<crate::AppState>) -> AppResult<Json<NextIdResponse>> {
    let next_id = state.services.notes.peek_next_id().await?;
    Ok(Json(NextIdResponse { next_id }))
}

/// Get a note or reminder
#[utoipa::path(
    get,
    path = "/notes/{id}",
    tag = "notes",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note", body = Note),
        (status = 404, description = "Note not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_note(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Note>> {
    Ok(Json(state.services.notes.get(id).await?))
}

/// Create a note, or a reminder when `reminder` is set
#[utoipa::path(
    post,
    path = "/notes",
    tag = "notes",
    request_body = CreateNote,
    responses(
        (status = 201, description = "Note created", body = Note),
        (status = 400, description = "Empty content, bad or past reminder time", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_note(
    State(state): State<crate::AppState>,
    ValidatedJson(request): ValidatedJson<CreateNote>,
) -> AppResult<(StatusCode, Json<Note>)> {
    let note = state.services.notes.create(request).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Merge fields into a note
#[utoipa::path(
    put,
    path = "/notes/{id}",
    tag = "notes",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = NotePatch,
    responses(
        (status = 200, description = "Note updated", body = Note),
        (status = 400, description = "Invalid field or past reminder time", body = crate::error::ErrorResponse),
        (status = 404, description = "Note not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_note(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<NotePatch>,
) -> AppResult<Json<Note>> {
    Ok(Json(state.services.notes.update(id, &patch.0).await?))
}

/// Merge fields into several notes; unknown ids are skipped
#[utoipa::path(
    put,
    path = "/notes",
    tag = "notes",
    request_body = Vec<NotePatch>,
    responses(
        (status = 200, description = "Updated notes", body = Vec<Note>),
        (status = 400, description = "Invalid field or past reminder time", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_notes(
    State(state): State<crate::AppState>,
    JsonBody(patches): JsonBody<Vec<NotePatch>>,
) -> AppResult<Json<Vec<Note>>> {
    let patches: Vec<Map<String, Value>> = patches.into_iter().map(|p| p.0).collect();
    Ok(Json(state.services.notes.update_many(&patches).await?))
}

/// Delete a note or reminder
#[utoipa::path(
    delete,
    path = "/notes/{id}",
    tag = "notes",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note deleted", body = MessageResponse),
        (status = 404, description = "Note not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_note(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    state.services.notes.delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Note deleted successfully".to_string(),
    }))
}
