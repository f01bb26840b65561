//! courtside-reports server entry point.
//!
//! Starts the Axum HTTP server with the team read-cache, report and
//! identity endpoints.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use courtside_reports::api;
use courtside_reports::app_state::AppState;
use courtside_reports::config::{LogFormat, ReportsConfig};
use courtside_reports::domain::{Clock, EventBus, SystemClock};
use courtside_reports::identity::IdentityProviders;
use courtside_reports::persistence::{
    MemoryPersistence, PostgresPersistence, ReportStore, SnapshotStore,
};
use courtside_reports::service::{ReportService, TeamCache, spawn_invalidation_listener};
use courtside_reports::upstream::{HttpTeamsClient, TeamsUpstream};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = ReportsConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting courtside-reports");

    // Build persistence layer
    let (snapshots, reports): (Arc<dyn SnapshotStore>, Arc<dyn ReportStore>) =
        if config.persistence_enabled {
            let store = Arc::new(PostgresPersistence::connect(&config).await?);
            (Arc::clone(&store) as Arc<dyn SnapshotStore>, store as Arc<dyn ReportStore>)
        } else {
            tracing::warn!("persistence disabled; snapshots and report history are in-memory only");
            let store = Arc::new(MemoryPersistence::new());
            (Arc::clone(&store) as Arc<dyn SnapshotStore>, store as Arc<dyn ReportStore>)
        };

    // Build service layer
    let upstream: Arc<dyn TeamsUpstream> = Arc::new(HttpTeamsClient::new(&config.upstream)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let team_cache = Arc::new(TeamCache::new(snapshots, upstream, clock, &config.cache));
    let report_service = Arc::new(ReportService::new(Arc::clone(&team_cache), reports));

    // Wire team events to cache invalidation
    let event_bus = EventBus::new(config.event_bus_capacity);
    let _listener = spawn_invalidation_listener(Arc::clone(&team_cache), event_bus.subscribe());

    // Build application state
    let app_state = AppState {
        team_cache,
        report_service,
        event_bus,
        identity: Arc::new(IdentityProviders::from_config(&config.identity)?),
    };

    // Build router
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(
        addr = %config.listen_addr,
        ttl_secs = config.cache.ttl.as_secs(),
        "server listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
