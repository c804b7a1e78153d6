//! Student registry and librarian views of a student

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use crate::domain::{Action, Caller, CirculationError, CreateStudentInput, authorize};
use super::extract::ApiJson;
use crate::infrastructure::AppState;
use crate::services::report_service;

#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "Students with their circulation counts", body = [report_service::StudentSummary]),
        (status = 403, description = "Caller is not a librarian")
    )
)]
pub async fn list_students(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Response, CirculationError> {
    let students = report_service::student_summaries(state.db(), &caller).await?;
    let total = students.len();

    Ok(Json(json!({
        "students": students,
        "total": total
    }))
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentInput,
    responses(
        (status = 201, description = "Student registered"),
        (status = 409, description = "Student id, email or identity already registered"),
        (status = 422, description = "Invalid student")
    )
)]
pub async fn create_student(
    State(state): State<AppState>,
    caller: Caller,
    ApiJson(payload): ApiJson<CreateStudentInput>,
) -> Result<Response, CirculationError> {
    authorize(&caller, Action::ManageCatalogue)?;
    let student = state.student_repo.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "student": student,
            "message": "Student registered successfully"
        })),
    )
        .into_response())
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = i32, Path, description = "Student row id")),
    responses(
        (status = 200, description = "Records, fines and amount owed", body = report_service::StudentDetail),
        (status = 404, description = "No such student")
    )
)]
pub async fn get_student(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Response, CirculationError> {
    let detail = report_service::student_detail(state.db(), &caller, id, Utc::now()).await?;
    Ok(Json(detail).into_response())
}

#[utoipa::path(
    get,
    path = "/api/students/{id}/fines/pending",
    params(("id" = i32, Path, description = "Student row id")),
    responses(
        (status = 200, description = "Amount currently owed", body = report_service::PendingFineAmount),
        (status = 404, description = "No such student")
    )
)]
pub async fn pending_fines(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Response, CirculationError> {
    let pending =
        report_service::student_pending_fines(state.db(), &caller, id, Utc::now()).await?;
    Ok(Json(pending).into_response())
}
