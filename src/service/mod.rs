//! Service layer: the team read-cache and report orchestration.
//!
//! [`TeamCache`] serves team snapshots with bounded staleness and coalesced
//! upstream fetches. [`ReportService`] builds reports on top of it and
//! records them in the history log. The invalidation listener connects
//! the [`crate::domain::EventBus`] to the cache.

pub mod invalidation;
pub mod report_service;
pub mod team_cache;

pub use invalidation::spawn_invalidation_listener;
pub use report_service::{HISTORY_LIMIT, ReportService, TeamReport};
pub use team_cache::{CacheStatus, TeamCache, TeamLookup};
