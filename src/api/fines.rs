use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{Caller, CirculationError};
use crate::infrastructure::AppState;
use crate::models::fine::{FineDto, FineStatus};
use crate::services::fine_service;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FineFilter {
    pub status: Option<FineStatus>,
}

#[utoipa::path(
    get,
    path = "/api/fines",
    params(FineFilter),
    responses(
        (status = 200, description = "Fines with student and book", body = [fine_service::FineWithDetails]),
        (status = 403, description = "Caller is not a librarian")
    )
)]
pub async fn list_fines(
    State(state): State<AppState>,
    caller: Caller,
    Query(filter): Query<FineFilter>,
) -> Result<Response, CirculationError> {
    let fines = fine_service::list_fines(state.db(), &caller, filter.status).await?;
    let total = fines.len();
    let total_amount: f64 = fines.iter().map(|f| f.amount).sum();

    Ok(Json(json!({
        "fines": fines,
        "total": total,
        "total_amount": total_amount
    }))
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/fines/{id}/mark-paid",
    params(("id" = i32, Path, description = "Fine id")),
    responses(
        (status = 200, description = "Fine marked paid", body = FineDto),
        (status = 404, description = "No such fine"),
        (status = 409, description = "Fine already paid")
    )
)]
pub async fn mark_paid(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<i32>,
) -> Result<Response, CirculationError> {
    let fine = fine_service::mark_fine_paid(state.db(), &caller, id, Utc::now()).await?;

    Ok(Json(json!({
        "fine": FineDto::from(fine),
        "message": "Fine marked as paid"
    }))
    .into_response())
}
