//! PostgreSQL implementation of the persistence layer.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{CachedTeamRow, NewReport, ReportRecord, counter_to_column};
use super::{ReportStore, SnapshotStore};
use crate::config::ReportsConfig;
use crate::domain::{CachedTeamSnapshot, TeamId, TeamRecord};
use crate::error::ReportsError;

/// Embedded migrations from `./migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const SNAPSHOT_COLUMNS: &str =
    "id, name, city, coach, logo_url, games_played, games_won, games_lost, last_updated";

/// Row shape of `report_history`.
type ReportRow = (
    i64,
    String,
    Option<String>,
    String,
    DateTime<Utc>,
    serde_json::Value,
);

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool sized from `config` and applies pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`ReportsError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &ReportsConfig) -> Result<Self, ReportsError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(std::time::Duration::from_secs(
                config.database_connect_timeout_secs,
            ))
            .connect(&config.database_url)
            .await?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| ReportsError::PersistenceError(e.to_string()))?;

        tracing::info!(
            max_connections = config.database_max_connections,
            "connected to postgres and applied migrations"
        );
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SnapshotStore for PostgresPersistence {
    async fn load(&self, id: &TeamId) -> Result<Option<CachedTeamSnapshot>, ReportsError> {
        let row = sqlx::query_as::<_, CachedTeamRow>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM cached_teams WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CachedTeamSnapshot::from))
    }

    /// Single-statement upsert: the row lock taken by `ON CONFLICT DO
    /// UPDATE` makes the replace atomic, and `GREATEST` keeps
    /// `last_updated` strictly increasing even when the caller's clock
    /// lags the stored stamp.
    async fn upsert(
        &self,
        team: &TeamRecord,
        now: DateTime<Utc>,
    ) -> Result<CachedTeamSnapshot, ReportsError> {
        let row = sqlx::query_as::<_, CachedTeamRow>(&format!(
            "INSERT INTO cached_teams ({SNAPSHOT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 city = EXCLUDED.city, \
                 coach = EXCLUDED.coach, \
                 logo_url = EXCLUDED.logo_url, \
                 games_played = EXCLUDED.games_played, \
                 games_won = EXCLUDED.games_won, \
                 games_lost = EXCLUDED.games_lost, \
                 last_updated = GREATEST(EXCLUDED.last_updated, \
                     cached_teams.last_updated + INTERVAL '1 microsecond') \
             RETURNING {SNAPSHOT_COLUMNS}"
        ))
        .bind(team.id.as_str())
        .bind(&team.name)
        .bind(&team.city)
        .bind(&team.coach)
        .bind(&team.logo_url)
        .bind(counter_to_column(team.games_played))
        .bind(counter_to_column(team.games_won))
        .bind(counter_to_column(team.games_lost))
        .bind(now.trunc_subsecs(6))
        .fetch_one(&self.pool)
        .await?;

        Ok(CachedTeamSnapshot::from(row))
    }

    async fn list(&self) -> Result<Vec<CachedTeamSnapshot>, ReportsError> {
        let rows = sqlx::query_as::<_, CachedTeamRow>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM cached_teams ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CachedTeamSnapshot::from).collect())
    }
}

#[async_trait]
impl ReportStore for PostgresPersistence {
    async fn append(&self, report: NewReport) -> Result<ReportRecord, ReportsError> {
        let row = sqlx::query_as::<_, ReportRow>(
            "INSERT INTO report_history (report_type, entity_id, entity_name, metadata) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, report_type, entity_id, entity_name, generated_at, metadata",
        )
        .bind(&report.report_type)
        .bind(report.entity_id.as_ref().map(TeamId::as_str))
        .bind(&report.entity_name)
        .bind(&report.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(report_from_row(row))
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ReportRecord>, ReportsError> {
        let rows = sqlx::query_as::<_, ReportRow>(
            "SELECT id, report_type, entity_id, entity_name, generated_at, metadata \
             FROM report_history ORDER BY generated_at DESC, id DESC LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(report_from_row).collect())
    }

    async fn find(&self, id: i64) -> Result<Option<ReportRecord>, ReportsError> {
        let row = sqlx::query_as::<_, ReportRow>(
            "SELECT id, report_type, entity_id, entity_name, generated_at, metadata \
             FROM report_history WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(report_from_row))
    }
}

fn report_from_row(
    (id, report_type, entity_id, entity_name, generated_at, metadata): ReportRow,
) -> ReportRecord {
    ReportRecord {
        id,
        report_type,
        entity_id: entity_id.map(TeamId::from),
        entity_name,
        generated_at,
        metadata,
    }
}
