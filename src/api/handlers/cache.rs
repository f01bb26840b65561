//! Read-cache administration: list, write-through upsert, invalidate.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ListResponse, UpsertTeamRequest, team_id_from_path};
use crate::app_state::AppState;
use crate::domain::CachedTeamSnapshot;
use crate::error::{ErrorResponse, ReportsError};

/// `GET /cache/teams` — List every stored snapshot.
///
/// # Errors
///
/// Returns [`ReportsError::PersistenceError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/cache/teams",
    tag = "Cache",
    summary = "List cached teams",
    description = "Returns every stored snapshot ordered by team id, regardless of staleness. Never contacts the Teams service.",
    responses(
        (status = 200, description = "Stored snapshots", body = ListResponse<CachedTeamSnapshot>),
    )
)]
pub async fn list_cached_teams(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ReportsError> {
    let snapshots = state.team_cache.list().await?;
    Ok(Json(ListResponse::new(snapshots)))
}

/// `PUT /cache/teams/{id}` — Write a team into the cache.
///
/// # Errors
///
/// Returns [`ReportsError::InvalidRequest`] for a blank id or name.
#[utoipa::path(
    put,
    path = "/api/v1/cache/teams/{id}",
    tag = "Cache",
    summary = "Upsert cached team",
    description = "Stores the team under the path id and stamps it with a fresh `lastUpdated`. Repeating the call updates the same row.",
    params(
        ("id" = String, Path, description = "Teams service identifier"),
    ),
    request_body = UpsertTeamRequest,
    responses(
        (status = 200, description = "Stored snapshot", body = CachedTeamSnapshot),
        (status = 400, description = "Blank id or name", body = ErrorResponse),
    )
)]
pub async fn upsert_cached_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpsertTeamRequest>,
) -> Result<impl IntoResponse, ReportsError> {
    let team_id = team_id_from_path(id)?;
    let snapshot = state.team_cache.upsert(&req.into_record(team_id)).await?;
    Ok(Json(snapshot))
}

/// `DELETE /cache/teams/{id}` — Mark a snapshot for refetch.
///
/// The stored row is kept as a stale fallback; the next read goes to the
/// Teams service.
///
/// # Errors
///
/// Returns [`ReportsError::InvalidRequest`] for a blank id.
#[utoipa::path(
    delete,
    path = "/api/v1/cache/teams/{id}",
    tag = "Cache",
    summary = "Invalidate cached team",
    description = "Forces the next read of this team to refetch from the Teams service. The stored snapshot remains available as a stale fallback.",
    params(
        ("id" = String, Path, description = "Teams service identifier"),
    ),
    responses(
        (status = 204, description = "Snapshot invalidated"),
        (status = 400, description = "Blank id", body = ErrorResponse),
    )
)]
pub async fn invalidate_cached_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ReportsError> {
    let team_id = team_id_from_path(id)?;
    state.team_cache.invalidate(&team_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Cache administration routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cache/teams", get(list_cached_teams))
        .route(
            "/cache/teams/{id}",
            axum::routing::put(upsert_cached_team).delete(invalidate_cached_team),
        )
}
