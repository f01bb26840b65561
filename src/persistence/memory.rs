//! In-process implementation of the storage traits.
//!
//! Snapshots live in a `RwLock<HashMap<..>>`: reads share the lock and an
//! upsert holds the write lock for the whole read-stamp-replace sequence,
//! so two writers of the same row can never interleave.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::models::{NewReport, ReportRecord};
use super::{ReportStore, SnapshotStore};
use crate::domain::{CachedTeamSnapshot, TeamId, TeamRecord, next_write_stamp};
use crate::error::ReportsError;

/// Memory-backed snapshot store and report log.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    teams: RwLock<HashMap<TeamId, CachedTeamSnapshot>>,
    reports: RwLock<Vec<ReportRecord>>,
}

impl MemoryPersistence {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached snapshots.
    pub async fn len(&self) -> usize {
        self.teams.read().await.len()
    }

    /// Returns `true` if no snapshot has been written.
    pub async fn is_empty(&self) -> bool {
        self.teams.read().await.is_empty()
    }
}

#[async_trait]
impl SnapshotStore for MemoryPersistence {
    async fn load(&self, id: &TeamId) -> Result<Option<CachedTeamSnapshot>, ReportsError> {
        Ok(self.teams.read().await.get(id).cloned())
    }

    async fn upsert(
        &self,
        team: &TeamRecord,
        now: DateTime<Utc>,
    ) -> Result<CachedTeamSnapshot, ReportsError> {
        let mut map = self.teams.write().await;
        let previous = map.get(&team.id).map(|s| s.last_updated);
        let snapshot = CachedTeamSnapshot {
            team: team.clone(),
            last_updated: next_write_stamp(previous, now),
        };
        map.insert(team.id.clone(), snapshot.clone());
        Ok(snapshot)
    }

    async fn list(&self) -> Result<Vec<CachedTeamSnapshot>, ReportsError> {
        let map = self.teams.read().await;
        let mut snapshots: Vec<CachedTeamSnapshot> = map.values().cloned().collect();
        snapshots.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(snapshots)
    }
}

#[async_trait]
impl ReportStore for MemoryPersistence {
    async fn append(&self, report: NewReport) -> Result<ReportRecord, ReportsError> {
        let mut log = self.reports.write().await;
        let id = log.last().map_or(1, |r| r.id.saturating_add(1));
        let record = ReportRecord {
            id,
            report_type: report.report_type,
            entity_id: report.entity_id,
            entity_name: report.entity_name,
            generated_at: Utc::now(),
            metadata: report.metadata,
        };
        log.push(record.clone());
        Ok(record)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ReportRecord>, ReportsError> {
        let log = self.reports.read().await;
        Ok(log.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn find(&self, id: i64) -> Result<Option<ReportRecord>, ReportsError> {
        let log = self.reports.read().await;
        Ok(log.iter().find(|r| r.id == id).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn lakers() -> TeamRecord {
        TeamRecord::new("T1", "Lakers").with_record(10, 7, 3)
    }

    #[tokio::test]
    async fn upsert_and_load() {
        let store = MemoryPersistence::new();
        let now = Utc::now();

        let Ok(written) = store.upsert(&lakers(), now).await else {
            panic!("upsert failed");
        };
        assert_eq!(written.last_updated, now);

        let Ok(Some(loaded)) = store.load(&TeamId::from("T1")).await else {
            panic!("snapshot missing");
        };
        assert_eq!(loaded, written);
    }

    #[tokio::test]
    async fn load_unknown_returns_none() {
        let store = MemoryPersistence::new();
        let loaded = store.load(&TeamId::from("nope")).await;
        assert!(matches!(loaded, Ok(None)));
    }

    #[tokio::test]
    async fn repeated_upsert_keeps_one_row() {
        let store = MemoryPersistence::new();
        let now = Utc::now();
        let _ = store.upsert(&lakers(), now).await;
        let _ = store.upsert(&lakers(), now).await;

        assert_eq!(store.len().await, 1);
        let all = store.list().await.unwrap_or_default();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn same_instant_writes_still_advance_stamp() {
        let store = MemoryPersistence::new();
        let now = Utc::now();
        let Ok(first) = store.upsert(&lakers(), now).await else {
            panic!("first upsert failed");
        };
        let Ok(second) = store.upsert(&lakers(), now).await else {
            panic!("second upsert failed");
        };
        assert!(second.last_updated > first.last_updated);

        // A clock that went backwards must not move the stamp back.
        let Ok(third) = store.upsert(&lakers(), now - Duration::seconds(10)).await else {
            panic!("third upsert failed");
        };
        assert!(third.last_updated > second.last_updated);
    }

    #[tokio::test]
    async fn upsert_replaces_every_field() {
        let store = MemoryPersistence::new();
        let now = Utc::now();
        let full = lakers().with_city("Los Angeles").with_coach("Redick");
        let _ = store.upsert(&full, now).await;
        let _ = store.upsert(&lakers(), now + Duration::seconds(1)).await;

        let Ok(Some(loaded)) = store.load(&TeamId::from("T1")).await else {
            panic!("snapshot missing");
        };
        assert_eq!(loaded.team.city, None);
        assert_eq!(loaded.team.coach, None);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = MemoryPersistence::new();
        let now = Utc::now();
        let _ = store.upsert(&TeamRecord::new("T2", "Celtics"), now).await;
        let _ = store.upsert(&TeamRecord::new("T1", "Lakers"), now).await;

        let ids: Vec<String> = store
            .list()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.team.id.to_string())
            .collect();
        assert_eq!(ids, vec!["T1".to_string(), "T2".to_string()]);
    }

    #[tokio::test]
    async fn report_log_is_newest_first() {
        let store = MemoryPersistence::new();
        for name in ["first", "second", "third"] {
            let _ = store
                .append(NewReport {
                    report_type: "team".to_string(),
                    entity_id: None,
                    entity_name: name.to_string(),
                    metadata: serde_json::json!({}),
                })
                .await;
        }

        let recent = store.recent(2).await.unwrap_or_default();
        let names: Vec<&str> = recent.iter().map(|r| r.entity_name.as_str()).collect();
        assert_eq!(names, vec!["third", "second"]);

        let Ok(Some(first)) = store.find(1).await else {
            panic!("report 1 missing");
        };
        assert_eq!(first.entity_name, "first");
        assert!(matches!(store.find(99).await, Ok(None)));
    }
}
