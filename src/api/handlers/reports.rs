//! Report generation and history handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{HistoryParams, ListResponse, team_id_from_path};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ReportsError};
use crate::persistence::ReportRecord;
use crate::service::TeamReport;

/// `POST /reports/team/{id}` — Generate a team summary report.
///
/// # Errors
///
/// Propagates cache lookup failures and history write failures.
#[utoipa::path(
    post,
    path = "/api/v1/reports/team/{id}",
    tag = "Reports",
    summary = "Generate team report",
    description = "Builds a summary report from the team read-cache and appends it to the report history.",
    params(
        ("id" = String, Path, description = "Teams service identifier"),
    ),
    responses(
        (status = 201, description = "Report generated", body = TeamReport),
        (status = 404, description = "Team not found", body = ErrorResponse),
        (status = 503, description = "Teams service unavailable and nothing cached", body = ErrorResponse),
    )
)]
pub async fn create_team_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ReportsError> {
    let team_id = team_id_from_path(id)?;
    let report = state.report_service.team_report(&team_id).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// `GET /reports/history` — List recent reports, newest first.
///
/// # Errors
///
/// Returns [`ReportsError::PersistenceError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/reports/history",
    tag = "Reports",
    summary = "List report history",
    description = "Returns up to `limit` (max 50) history records, newest first.",
    params(HistoryParams),
    responses(
        (status = 200, description = "History records", body = ListResponse<ReportRecord>),
    )
)]
pub async fn list_report_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, ReportsError> {
    let records = state.report_service.history(params.limit).await?;
    Ok(Json(ListResponse::new(records)))
}

/// `GET /reports/history/{id}` — Get one history record.
///
/// # Errors
///
/// Returns [`ReportsError::ReportNotFound`] if no record has `id`.
#[utoipa::path(
    get,
    path = "/api/v1/reports/history/{id}",
    tag = "Reports",
    summary = "Get report history entry",
    params(
        ("id" = i64, Path, description = "History record id"),
    ),
    responses(
        (status = 200, description = "History record", body = ReportRecord),
        (status = 404, description = "Record not found", body = ErrorResponse),
    )
)]
pub async fn get_report_history_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ReportsError> {
    let record = state.report_service.report(id).await?;
    Ok(Json(record))
}

/// Report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/team/{id}", post(create_team_report))
        .route("/reports/history", get(list_report_history))
        .route("/reports/history/{id}", get(get_report_history_entry))
}
