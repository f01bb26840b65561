//! Persistence layer: cached team snapshots and report history.
//!
//! Two storage traits sit at the seam between the services and storage:
//! [`SnapshotStore`] for the team read-cache table and [`ReportStore`] for
//! the report history log. [`postgres::PostgresPersistence`] implements
//! both over `sqlx::PgPool`; [`memory::MemoryPersistence`] implements both
//! in process for `PERSISTENCE_ENABLED=false` and for tests.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CachedTeamSnapshot, TeamId, TeamRecord};
use crate::error::ReportsError;

pub use memory::MemoryPersistence;
pub use models::{NewReport, ReportRecord};
pub use postgres::PostgresPersistence;

/// Point lookup and point upsert over cached team snapshots.
///
/// Implementations hold exactly one snapshot per [`TeamId`] and perform
/// each upsert atomically for its row.
#[async_trait]
pub trait SnapshotStore: Send + Sync + Debug {
    /// Loads the snapshot for `id`, if one has been written.
    async fn load(&self, id: &TeamId) -> Result<Option<CachedTeamSnapshot>, ReportsError>;

    /// Inserts or fully replaces the snapshot for `team.id`.
    ///
    /// The stored `last_updated` is `now`, or one microsecond past the
    /// replaced row's stamp when `now` would not move it forward (see
    /// [`crate::domain::next_write_stamp`]). Returns the stored snapshot.
    async fn upsert(
        &self,
        team: &TeamRecord,
        now: DateTime<Utc>,
    ) -> Result<CachedTeamSnapshot, ReportsError>;

    /// Returns every snapshot ordered by team id.
    async fn list(&self) -> Result<Vec<CachedTeamSnapshot>, ReportsError>;
}

/// Append-only log of generated reports.
#[async_trait]
pub trait ReportStore: Send + Sync + Debug {
    /// Appends a report and returns the stored record.
    async fn append(&self, report: NewReport) -> Result<ReportRecord, ReportsError>;

    /// Returns up to `limit` records, newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<ReportRecord>, ReportsError>;

    /// Looks up a single record.
    async fn find(&self, id: i64) -> Result<Option<ReportRecord>, ReportsError>;
}
