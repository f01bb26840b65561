//! Team read handler backed by the read-cache.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{TeamResponse, team_id_from_path};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ReportsError};

/// `GET /teams/{id}` — Read a team through the cache.
///
/// # Errors
///
/// Returns [`ReportsError::TeamNotFound`] or
/// [`ReportsError::UpstreamUnavailable`] when no snapshot can be produced.
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}",
    tag = "Teams",
    summary = "Get team",
    description = "Returns the cached team snapshot, refetching it from the Teams service when missing, older than the TTL, or invalidated. If the Teams service fails and a snapshot exists, the old snapshot is returned with `cacheStatus = stale_served`.",
    params(
        ("id" = String, Path, description = "Teams service identifier"),
    ),
    responses(
        (status = 200, description = "Team snapshot", body = TeamResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
        (status = 503, description = "Teams service unavailable and nothing cached", body = ErrorResponse),
    )
)]
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ReportsError> {
    let team_id = team_id_from_path(id)?;
    let lookup = state.team_cache.get(&team_id).await?;
    Ok(Json(TeamResponse::from(lookup)))
}

/// Team routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/teams/{id}", get(get_team))
}
