//! Catalogue API handlers using repository pattern

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::{
    Action, Caller, CirculationError, CreateBookInput, UpdateBookInput, authorize,
};
use super::extract::ApiJson;
use crate::infrastructure::AppState;

#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "All books ordered by title"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    _caller: Caller,
) -> Result<Response, CirculationError> {
    let books = state.book_repo.find_all().await?;
    let total = books.len();

    Ok(Json(json!({
        "books": books,
        "total": total
    }))
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/books",
    request_body = CreateBookInput,
    responses(
        (status = 201, description = "Book created"),
        (status = 403, description = "Caller is not a librarian"),
        (status = 409, description = "ISBN already in the catalogue"),
        (status = 422, description = "Invalid book")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(payload): ApiJson<CreateBookInput>,
) -> Result<Response, CirculationError> {
    authorize(&caller, Action::ManageCatalogue)?;
    let book = state.book_repo.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "book": book,
            "message": "Book created successfully"
        })),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book found"),
        (status = 404, description = "No such book")
    )
)]
pub async fn get_book(
    State(state): State<AppState>,
    _caller: Caller,
    Path(id): Path<i32>,
) -> Result<Response, CirculationError> {
    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(CirculationError::NotFound("Book"))?;

    Ok(Json(json!({ "book": book })).into_response())
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    request_body = UpdateBookInput,
    responses(
        (status = 200, description = "Book updated"),
        (status = 404, description = "No such book"),
        (status = 422, description = "Copies would go negative or below those on loan")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<UpdateBookInput>,
) -> Result<Response, CirculationError> {
    authorize(&caller, Action::ManageCatalogue)?;
    let book = state.book_repo.update(id, payload).await?;

    Ok(Json(json!({ "book": book })).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = i32, Path, description = "Book id")),
    responses(
        (status = 200, description = "Book and its borrow history deleted"),
        (status = 404, description = "No such book")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Response, CirculationError> {
    authorize(&caller, Action::ManageCatalogue)?;
    state.book_repo.delete(id).await?;

    Ok((
        StatusCode::OK,
        Json(json!({"message": "Book deleted successfully"})),
    )
        .into_response())
}
