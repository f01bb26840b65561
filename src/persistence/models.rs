//! Database models for cached teams and report history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CachedTeamSnapshot, TeamId, TeamRecord};

/// A row of the `cached_teams` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CachedTeamRow {
    /// Teams service identifier (primary key).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Home city.
    pub city: Option<String>,
    /// Head coach.
    pub coach: Option<String>,
    /// Logo URL.
    pub logo_url: Option<String>,
    /// Games played (`CHECK >= 0`).
    pub games_played: i32,
    /// Games won (`CHECK >= 0`).
    pub games_won: i32,
    /// Games lost (`CHECK >= 0`).
    pub games_lost: i32,
    /// Write timestamp.
    pub last_updated: DateTime<Utc>,
}

impl From<CachedTeamRow> for CachedTeamSnapshot {
    fn from(row: CachedTeamRow) -> Self {
        Self {
            team: TeamRecord {
                id: TeamId::from(row.id),
                name: row.name,
                city: row.city,
                coach: row.coach,
                logo_url: row.logo_url,
                games_played: counter_from_column(row.games_played),
                games_won: counter_from_column(row.games_won),
                games_lost: counter_from_column(row.games_lost),
            },
            last_updated: row.last_updated,
        }
    }
}

/// Converts an `INTEGER` counter column to `u32`. The table constraint
/// keeps counters non-negative.
fn counter_from_column(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Converts a `u32` counter to the `INTEGER` column type, saturating.
pub(crate) fn counter_to_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// A report to append to the history log. The store assigns `id` and
/// `generated_at`.
#[derive(Debug, Clone)]
pub struct NewReport {
    /// Report kind discriminator (e.g. `"team"`).
    pub report_type: String,
    /// Entity the report is about, if any.
    pub entity_id: Option<TeamId>,
    /// Human-readable entity name.
    pub entity_name: String,
    /// Free-form JSON metadata.
    pub metadata: serde_json::Value,
}

/// A row of the `report_history` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReportRecord {
    /// Auto-increment row ID.
    pub id: i64,
    /// Report kind discriminator.
    pub report_type: String,
    /// Entity the report is about, if any.
    pub entity_id: Option<TeamId>,
    /// Human-readable entity name.
    pub entity_name: String,
    /// Generation timestamp.
    pub generated_at: DateTime<Utc>,
    /// Free-form JSON metadata.
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}
