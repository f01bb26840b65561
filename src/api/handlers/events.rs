//! Team event ingest.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{EventAcceptedResponse, RelayedTeamEvent};
use crate::app_state::AppState;
use crate::domain::{TeamEvent, TeamEventKind};
use crate::error::{ErrorResponse, ReportsError};

/// `POST /events/teams` — Accept a team lifecycle event.
///
/// # Errors
///
/// Returns [`ReportsError::InvalidRequest`] if the event names a blank
/// team id.
#[utoipa::path(
    post,
    path = "/api/v1/events/teams",
    tag = "Events",
    summary = "Ingest team event",
    description = "Publishes a `team_created`, `team_updated` or `team_deleted` event on the internal bus. The cache invalidation listener marks the team for refetch.",
    request_body = TeamEvent,
    responses(
        (status = 202, description = "Event accepted", body = EventAcceptedResponse),
        (status = 400, description = "Invalid event", body = ErrorResponse),
    )
)]
pub async fn ingest_team_event(
    State(state): State<AppState>,
    Json(event): Json<TeamEvent>,
) -> Result<impl IntoResponse, ReportsError> {
    publish(&state, event)
}

/// `POST /events/teams/{kind}` — Accept an event as the Teams service
/// publishes it.
///
/// # Errors
///
/// Returns [`ReportsError::InvalidRequest`] for an unknown kind, a blank
/// team id, or a created/updated event without `TeamName`.
#[utoipa::path(
    post,
    path = "/api/v1/events/teams/{kind}",
    tag = "Events",
    summary = "Ingest relayed team event",
    description = "Accepts the Teams service's own PascalCase event body. The kind comes from the path, either as `created` / `updated` / `deleted` or as the routing key (`team.updated`).",
    params(
        ("kind" = String, Path, description = "Event kind or routing key"),
    ),
    request_body = RelayedTeamEvent,
    responses(
        (status = 202, description = "Event accepted", body = EventAcceptedResponse),
        (status = 400, description = "Invalid event", body = ErrorResponse),
    )
)]
pub async fn ingest_relayed_team_event(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(body): Json<RelayedTeamEvent>,
) -> Result<impl IntoResponse, ReportsError> {
    let kind: TeamEventKind = kind.parse()?;
    publish(&state, body.into_event(kind)?)
}

fn publish(
    state: &AppState,
    event: TeamEvent,
) -> Result<(StatusCode, Json<EventAcceptedResponse>), ReportsError> {
    if event.team_id().is_blank() {
        return Err(ReportsError::InvalidRequest(
            "team id must not be blank".to_string(),
        ));
    }

    let event_type = event.event_type();
    let team_id = event.team_id().clone();
    let receivers = state.event_bus.publish(event);
    tracing::info!(%team_id, event_type, receivers, "team event accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(EventAcceptedResponse {
            event_type: event_type.to_string(),
            team_id,
            receivers,
        }),
    ))
}

/// Event ingest routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/teams", post(ingest_team_event))
        .route("/events/teams/{kind}", post(ingest_relayed_team_event))
}
