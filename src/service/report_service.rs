//! Report service: team summary reports and the report history log.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{CacheStatus, TeamCache};
use crate::domain::{CachedTeamSnapshot, TeamId};
use crate::error::ReportsError;
use crate::persistence::{NewReport, ReportRecord, ReportStore};

/// Maximum number of history records returned by a single listing.
pub const HISTORY_LIMIT: u32 = 50;

/// Summary report for one team, built from the read-cache.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamReport {
    /// History log id of this report.
    pub report_id: i64,
    /// Team data the report was built from.
    pub team: CachedTeamSnapshot,
    /// `games_won / games_played`, `0.0` with no games.
    pub win_percentage: f64,
    /// Whether wins plus losses fit within games played.
    pub record_consistent: bool,
    /// How the team data was obtained.
    pub cache_status: CacheStatus,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
}

/// Builds reports from cached team data and records them in the history
/// log.
#[derive(Debug, Clone)]
pub struct ReportService {
    cache: Arc<TeamCache>,
    reports: Arc<dyn ReportStore>,
}

impl ReportService {
    /// Creates a new `ReportService`.
    #[must_use]
    pub fn new(cache: Arc<TeamCache>, reports: Arc<dyn ReportStore>) -> Self {
        Self { cache, reports }
    }

    /// Returns the team read-cache backing this service.
    #[must_use]
    pub const fn cache(&self) -> &Arc<TeamCache> {
        &self.cache
    }

    /// Generates a summary report for `team_id` and appends it to the
    /// history log. A stale cache read still produces a report; its
    /// `cache_status` says so.
    ///
    /// # Errors
    ///
    /// Propagates [`TeamCache::get`] failures and returns
    /// [`ReportsError::PersistenceError`] if the history append fails.
    pub async fn team_report(&self, team_id: &TeamId) -> Result<TeamReport, ReportsError> {
        tracing::info!(%team_id, "generating team report");
        let lookup = self.cache.get(team_id).await?;
        let team = lookup.snapshot;

        let win_percentage = team.team.win_percentage();
        let record_consistent = team.team.record_is_consistent();

        let record = self
            .reports
            .append(NewReport {
                report_type: "team".to_string(),
                entity_id: Some(team_id.clone()),
                entity_name: team.team.name.clone(),
                metadata: serde_json::json!({
                    "generated_by": "system",
                    "cache_status": lookup.status.as_str(),
                    "snapshot_last_updated": team.last_updated,
                }),
            })
            .await?;

        tracing::info!(%team_id, report_id = record.id, cache_status = lookup.status.as_str(), "team report saved to history");

        Ok(TeamReport {
            report_id: record.id,
            team,
            win_percentage,
            record_consistent,
            cache_status: lookup.status,
            generated_at: record.generated_at,
        })
    }

    /// Returns the most recent history records, newest first. `limit`
    /// defaults to and is capped at [`HISTORY_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::PersistenceError`] on store failure.
    pub async fn history(&self, limit: Option<u32>) -> Result<Vec<ReportRecord>, ReportsError> {
        let limit = limit.unwrap_or(HISTORY_LIMIT).clamp(1, HISTORY_LIMIT);
        self.reports.recent(limit).await
    }

    /// Returns a single history record.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::ReportNotFound`] if no record has `id`.
    pub async fn report(&self, id: i64) -> Result<ReportRecord, ReportsError> {
        self.reports
            .find(id)
            .await?
            .ok_or(ReportsError::ReportNotFound(id))
    }
}
