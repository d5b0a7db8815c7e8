//! Catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, NewBook},
};

use super::ValidatedJson;

/// Create book request
#[derive(Deserialize, Validate, ToSchema)]
pub struct CreateBookRequest {
    #[validate(length(max = 200, message = "Book name must be less than 200 characters"))]
    #[serde(default)]
    pub name: String,
    #[validate(length(max = 200, message = "Author must be less than 200 characters"))]
    #[serde(default)]
    pub author: String,
    /// Publication year, as a number or a numeric string
    #[schema(value_type = Object)]
    #[serde(default)]
    pub year: Value,
}

impl TryFrom<CreateBookRequest> for NewBook {
    type Error = AppError;

    fn try_from(request: CreateBookRequest) -> Result<Self, Self::Error> {
        let year = match request.year {
            Value::Null => String::new(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s,
            other => return Err(AppError::BadRequest(format!("Invalid year: {}", other))),
        };
        Ok(NewBook {
            name: request.name,
            author: request.author,
            year,
        })
    }
}

/// List the catalog in insertion order
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "All books", body = Vec<Book>)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> Json<Vec<Book>> {
    Json(state.services.library.list_books().await)
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book added", body = Book),
        (status = 400, description = "Missing field, invalid year or duplicate name", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    ValidatedJson(request): ValidatedJson<CreateBookRequest>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.library.add_book(request.try_into()?).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Delete a book that is not on loan
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book is on loan", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.services.library.delete_book(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
