//! Borrow and return handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{Caller, CirculationError};
use super::extract::ApiJson;
use crate::infrastructure::AppState;
use crate::models::borrow_record::BorrowRecordDto;
use crate::models::fine::FineDto;
use crate::services::{
    self, BorrowRequest, RecordFilter, VerifyReturnRequest, circulation_service, fine_service,
    report_service,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RejectReturnRequest {
    #[serde(default)]
    pub reason: String,
}

#[utoipa::path(
    post,
    path = "/api/books/{id}/borrow",
    params(("id" = i32, Path, description = "Book id")),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowRecordDto),
        (status = 403, description = "Only students can borrow"),
        (status = 409, description = "Unavailable, already borrowed, or student has overdue books"),
        (status = 422, description = "Loan period must be 7 or 14 days")
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    caller: Caller,
    Path(book_id): Path<i32>,
    ApiJson(payload): ApiJson<BorrowRequest>,
) -> Result<Response, CirculationError> {
    let record =
        circulation_service::borrow_book(state.db(), &caller, book_id, payload, Utc::now())
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "record": BorrowRecordDto::from(record),
            "message": "Book borrowed successfully"
        })),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/borrows",
    params(RecordFilter),
    responses(
        (status = 200, description = "Borrow records, newest first", body = [report_service::RecordWithDetails]),
        (status = 403, description = "Caller is not a librarian")
    )
)]
pub async fn list_borrows(
    State(state): State<AppState>,
    caller: Caller,
    Query(filter): Query<RecordFilter>,
) -> Result<Response, CirculationError> {
    let records = services::list_records(state.db(), &caller, filter, Utc::now()).await?;
    let total = records.len();

    Ok(Json(json!({
        "records": records,
        "total": total
    }))
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/borrows/{id}/request-return",
    params(("id" = i32, Path, description = "Borrow record id")),
    responses(
        (status = 200, description = "Return requested", body = BorrowRecordDto),
        (status = 403, description = "Record belongs to another student"),
        (status = 409, description = "Record is not out on loan")
    )
)]
pub async fn request_return(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Response, CirculationError> {
    let record = circulation_service::request_return(state.db(), &caller, id, Utc::now()).await?;

    Ok(Json(json!({
        "record": BorrowRecordDto::from(record),
        "message": "Return request submitted. A librarian will verify the return."
    }))
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/borrows/{id}/verify-return",
    params(("id" = i32, Path, description = "Borrow record id")),
    request_body = VerifyReturnRequest,
    responses(
        (status = 200, description = "Return verified, with any fine charged"),
        (status = 409, description = "Record is not pending return")
    )
)]
pub async fn verify_return(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<VerifyReturnRequest>,
) -> Result<Response, CirculationError> {
    let outcome =
        circulation_service::verify_return(state.db(), &caller, id, payload, Utc::now()).await?;

    Ok(Json(json!({
        "record": BorrowRecordDto::from(outcome.record),
        "fine": outcome.fine.map(FineDto::from),
        "message": "Return verified"
    }))
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/borrows/{id}/reject-return",
    params(("id" = i32, Path, description = "Borrow record id")),
    request_body = RejectReturnRequest,
    responses(
        (status = 200, description = "Return rejected, book stays on loan", body = BorrowRecordDto),
        (status = 409, description = "Record is not pending return")
    )
)]
pub async fn reject_return(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
    ApiJson(payload): ApiJson<RejectReturnRequest>,
) -> Result<Response, CirculationError> {
    let record =
        circulation_service::reject_return(state.db(), &caller, id, &payload.reason, Utc::now())
            .await?;

    Ok(Json(json!({
        "record": BorrowRecordDto::from(record),
        "message": "Return rejected"
    }))
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/borrows/{id}/settle-fine",
    params(("id" = i32, Path, description = "Borrow record id")),
    responses(
        (status = 200, description = "Fine charged and paid", body = FineDto),
        (status = 409, description = "Fine already paid"),
        (status = 422, description = "Nothing owed on this record")
    )
)]
pub async fn settle_fine(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Response, CirculationError> {
    let fine = fine_service::settle_fine(state.db(), &caller, id, Utc::now()).await?;

    Ok(Json(json!({
        "fine": FineDto::from(fine),
        "message": "Fine settled"
    }))
    .into_response())
}
