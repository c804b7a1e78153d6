//! Desk views: overdue sweep, librarian overview, student dashboard

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use crate::domain::{Caller, CirculationError};
use crate::infrastructure::AppState;
use crate::services::{report_service, sweep_service};

#[utoipa::path(
    post,
    path = "/api/circulation/sweep",
    responses(
        (status = 200, description = "Number of records moved to overdue"),
        (status = 403, description = "Caller is not a librarian")
    )
)]
pub async fn sweep(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Response, CirculationError> {
    let updated = sweep_service::sweep_overdue_as(state.db(), &caller, Utc::now()).await?;

    Ok(Json(json!({
        "updated": updated,
        "message": format!("Updated {} borrow records to overdue status", updated)
    }))
    .into_response())
}

#[utoipa::path(
    get,
    path = "/api/overview",
    responses(
        (status = 200, description = "Librarian overview", body = report_service::Overview),
        (status = 403, description = "Caller is not a librarian")
    )
)]
pub async fn overview(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Response, CirculationError> {
    let overview = report_service::overview(state.db(), &caller, Utc::now()).await?;
    Ok(Json(overview).into_response())
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "The calling student's loans and fines", body = report_service::StudentDashboard),
        (status = 403, description = "Caller is not a student"),
        (status = 404, description = "No student profile linked to this identity")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Response, CirculationError> {
    let dashboard = report_service::student_dashboard(state.db(), &caller, Utc::now()).await?;
    Ok(Json(dashboard).into_response())
}
