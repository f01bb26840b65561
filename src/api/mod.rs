//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; `/health` sits at
//! the root. The OpenAPI document is served at `/api-docs/openapi.json`
//! and, with the `swagger-ui` feature, browsable at `/swagger-ui`.

pub mod dto;
pub mod handlers;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// Upper bound on a single request, including any upstream refetch.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAPI document for every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Courtside Reports",
        description = "Team read-cache, team reports and report history for the basketball scoreboard."
    ),
    paths(
        handlers::system::health_handler,
        handlers::teams::get_team,
        handlers::cache::list_cached_teams,
        handlers::cache::upsert_cached_team,
        handlers::cache::invalidate_cached_team,
        handlers::events::ingest_team_event,
        handlers::events::ingest_relayed_team_event,
        handlers::reports::create_team_report,
        handlers::reports::list_report_history,
        handlers::reports::get_report_history_entry,
        handlers::identity::exchange_code,
    ),
    components(schemas(
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
        crate::domain::TeamRecord,
        crate::domain::CachedTeamSnapshot,
        crate::domain::TeamEvent,
        crate::api::dto::RelayedTeamEvent,
        crate::service::CacheStatus,
        crate::service::TeamReport,
        crate::persistence::ReportRecord,
        crate::identity::OAuthUser,
        crate::identity::ProviderKind,
    )),
    tags(
        (name = "Teams", description = "Team reads through the read-cache"),
        (name = "Cache", description = "Read-cache administration"),
        (name = "Events", description = "Team lifecycle event ingest"),
        (name = "Reports", description = "Report generation and history"),
        (name = "Identity", description = "OAuth code exchange"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the served application: API routes, OpenAPI document, tracing,
/// CORS and the request timeout, bound to `state`.
pub fn build_app(state: AppState) -> Router {
    let router = build_router().merge(openapi_routes());
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(feature = "swagger-ui")]
fn openapi_routes() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn openapi_routes() -> Router<AppState> {
    Router::new().route(
        "/api-docs/openapi.json",
        axum::routing::get(|| async { axum::Json(ApiDoc::openapi()) }),
    )
}
