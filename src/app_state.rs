//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::identity::IdentityProviders;
use crate::service::{ReportService, TeamCache};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Team read-cache.
    pub team_cache: Arc<TeamCache>,
    /// Report generation and history.
    pub report_service: Arc<ReportService>,
    /// Bus carrying ingested team events to the invalidation listener.
    pub event_bus: EventBus,
    /// Configured OAuth providers.
    pub identity: Arc<IdentityProviders>,
}
