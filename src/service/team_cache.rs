//! Team read-cache: bounded-staleness reads of Teams service data.
//!
//! [`TeamCache::get`] serves a stored snapshot while it is younger than the
//! configured TTL and not invalidated. Otherwise it refetches from the
//! Teams service, upserts, and returns the fresh snapshot. When the Teams
//! service cannot answer and a snapshot exists, the old snapshot is served
//! with [`CacheStatus::StaleServed`].
//!
//! # Concurrency
//!
//! - At most one upstream fetch is in flight per team id; concurrent
//!   callers that need a refetch await the same shared result.
//! - The fetch runs on its own task. Dropping a waiting `get` never
//!   cancels the fetch for the remaining waiters.
//! - Row atomicity of writes is the [`SnapshotStore`]'s contract.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::CacheConfig;
use crate::domain::{CachedTeamSnapshot, Clock, TeamId, TeamRecord};
use crate::error::ReportsError;
use crate::persistence::SnapshotStore;
use crate::upstream::TeamsUpstream;

/// How a [`TeamLookup`] was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Served from the store within TTL.
    Hit,
    /// Fetched from the Teams service during this call.
    Refreshed,
    /// The Teams service could not provide fresh data; the last stored
    /// snapshot was served instead.
    StaleServed,
}

impl CacheStatus {
    /// Returns the snake_case name used in responses and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Refreshed => "refreshed",
            Self::StaleServed => "stale_served",
        }
    }
}

/// Result of a successful [`TeamCache::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamLookup {
    /// The snapshot handed to the caller.
    pub snapshot: CachedTeamSnapshot,
    /// Where it came from.
    pub status: CacheStatus,
}

impl TeamLookup {
    /// Whether this read was a stale fallback.
    #[must_use]
    pub fn is_stale_served(&self) -> bool {
        self.status == CacheStatus::StaleServed
    }
}

/// Why a refetch produced no snapshot.
#[derive(Debug, Clone)]
enum RefreshFailure {
    Upstream(String),
    Persistence(String),
    Aborted(String),
}

/// `Ok(None)`: the Teams service does not know the team.
type RefreshOutcome = Result<Option<CachedTeamSnapshot>, RefreshFailure>;

type InFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

/// Invalidation marks keyed by team id. The value is the sequence number
/// of the latest `invalidate` call for that id.
type InvalidationMarks = HashMap<TeamId, u64>;

/// Read-through cache of Teams service snapshots.
pub struct TeamCache {
    store: Arc<dyn SnapshotStore>,
    upstream: Arc<dyn TeamsUpstream>,
    clock: Arc<dyn Clock>,
    ttl: chrono::Duration,
    in_flight: Arc<Mutex<HashMap<TeamId, InFlight>>>,
    invalidated: Arc<Mutex<InvalidationMarks>>,
    invalidation_seq: Arc<AtomicU64>,
}

impl fmt::Debug for TeamCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeamCache")
            .field("store", &self.store)
            .field("upstream", &self.upstream)
            .field("ttl", &self.ttl)
            .field("in_flight", &lock(&self.in_flight).len())
            .field("invalidated", &lock(&self.invalidated).len())
            .finish_non_exhaustive()
    }
}

impl TeamCache {
    /// Creates a cache over `store`, refreshing from `upstream`.
    #[must_use]
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        upstream: Arc<dyn TeamsUpstream>,
        clock: Arc<dyn Clock>,
        config: &CacheConfig,
    ) -> Self {
        let ttl = chrono::Duration::from_std(config.ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            store,
            upstream,
            clock,
            ttl,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            invalidated: Arc::new(Mutex::new(HashMap::new())),
            invalidation_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the configured TTL.
    #[must_use]
    pub const fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Returns the snapshot for `id`, refetching it when missing, stale or
    /// invalidated.
    ///
    /// # Errors
    ///
    /// - [`ReportsError::TeamNotFound`] if neither the store nor the Teams
    ///   service knows `id`.
    /// - [`ReportsError::UpstreamUnavailable`] if a refetch was needed, the
    ///   Teams service failed, and nothing is stored for `id`.
    /// - [`ReportsError::PersistenceError`] on store failure.
    pub async fn get(&self, id: &TeamId) -> Result<TeamLookup, ReportsError> {
        let cached = self.store.load(id).await?;

        if let Some(snapshot) = &cached
            && !self.is_invalidated(id)
            && !snapshot.is_stale(self.clock.now(), self.ttl)
        {
            tracing::debug!(team_id = %id, "team cache hit");
            return Ok(TeamLookup {
                snapshot: snapshot.clone(),
                status: CacheStatus::Hit,
            });
        }

        match self.join_or_start_refresh(id).await {
            Ok(Some(snapshot)) => Ok(TeamLookup {
                snapshot,
                status: CacheStatus::Refreshed,
            }),
            Ok(None) => match cached {
                Some(snapshot) => {
                    tracing::warn!(
                        team_id = %id,
                        last_updated = %snapshot.last_updated,
                        "teams service no longer knows team; serving stale snapshot"
                    );
                    Ok(stale(snapshot))
                }
                None => Err(ReportsError::TeamNotFound(id.clone())),
            },
            Err(RefreshFailure::Upstream(reason)) => match cached {
                Some(snapshot) => {
                    tracing::warn!(
                        team_id = %id,
                        last_updated = %snapshot.last_updated,
                        %reason,
                        "teams service unavailable; serving stale snapshot"
                    );
                    Ok(stale(snapshot))
                }
                None => Err(ReportsError::UpstreamUnavailable {
                    team_id: id.clone(),
                    reason,
                }),
            },
            Err(RefreshFailure::Persistence(reason)) => Err(ReportsError::PersistenceError(reason)),
            Err(RefreshFailure::Aborted(reason)) => Err(ReportsError::Internal(reason)),
        }
    }

    /// Writes `team` through to the store, replacing every field and
    /// resetting `last_updated`. Clears any invalidation mark for the team.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::InvalidRequest`] if the record fails
    /// validation, or [`ReportsError::PersistenceError`] on store failure.
    pub async fn upsert(&self, team: &TeamRecord) -> Result<CachedTeamSnapshot, ReportsError> {
        team.validate()?;
        warn_if_inconsistent(team);

        let seq = self.invalidation_seq.load(Ordering::SeqCst);
        let snapshot = self.store.upsert(team, self.clock.now()).await?;
        clear_mark(&self.invalidated, &team.id, seq);

        tracing::info!(team_id = %team.id, last_updated = %snapshot.last_updated, "team snapshot upserted");
        Ok(snapshot)
    }

    /// Forces the next [`TeamCache::get`] for `id` to refetch, regardless
    /// of TTL. The stored snapshot stays available as a stale fallback.
    pub fn invalidate(&self, id: &TeamId) {
        let seq = self.invalidation_seq.fetch_add(1, Ordering::SeqCst) + 1;
        lock(&self.invalidated).insert(id.clone(), seq);
        tracing::info!(team_id = %id, "team snapshot invalidated");
    }

    /// Invalidates every stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::PersistenceError`] if the store cannot be
    /// listed.
    pub async fn invalidate_all(&self) -> Result<usize, ReportsError> {
        let snapshots = self.store.list().await?;
        for snapshot in &snapshots {
            self.invalidate(snapshot.id());
        }
        Ok(snapshots.len())
    }

    /// Returns every stored snapshot ordered by team id.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::PersistenceError`] on store failure.
    pub async fn list(&self) -> Result<Vec<CachedTeamSnapshot>, ReportsError> {
        self.store.list().await
    }

    /// Returns the number of upstream fetches currently in flight.
    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Returns the number of teams currently marked for refetch.
    #[must_use]
    pub fn invalidation_mark_count(&self) -> usize {
        lock(&self.invalidated).len()
    }

    fn is_invalidated(&self, id: &TeamId) -> bool {
        lock(&self.invalidated).contains_key(id)
    }

    /// Returns the in-flight fetch for `id`, spawning one if none exists.
    ///
    /// The map lock is held across spawn and insert, so the task's own
    /// removal of its entry can only happen after the insert.
    fn join_or_start_refresh(&self, id: &TeamId) -> InFlight {
        let mut in_flight = lock(&self.in_flight);
        if let Some(existing) = in_flight.get(id) {
            tracing::debug!(team_id = %id, "joining in-flight team fetch");
            return existing.clone();
        }

        let task = RefreshTask {
            id: id.clone(),
            store: Arc::clone(&self.store),
            upstream: Arc::clone(&self.upstream),
            clock: Arc::clone(&self.clock),
            invalidated: Arc::clone(&self.invalidated),
            started_at_seq: self.invalidation_seq.load(Ordering::SeqCst),
        };
        let in_flight_map = Arc::clone(&self.in_flight);
        let handle = tokio::spawn(async move {
            let id = task.id.clone();
            let outcome = task.run().await;
            lock(&in_flight_map).remove(&id);
            outcome
        });

        let shared = async move {
            handle
                .await
                .unwrap_or_else(|e| Err(RefreshFailure::Aborted(format!("team fetch task failed: {e}"))))
        }
        .boxed()
        .shared();

        in_flight.insert(id.clone(), shared.clone());
        shared
    }
}

/// Everything a spawned refetch needs, detached from the cache's lifetime.
struct RefreshTask {
    id: TeamId,
    store: Arc<dyn SnapshotStore>,
    upstream: Arc<dyn TeamsUpstream>,
    clock: Arc<dyn Clock>,
    invalidated: Arc<Mutex<InvalidationMarks>>,
    started_at_seq: u64,
}

impl RefreshTask {
    async fn run(self) -> RefreshOutcome {
        tracing::info!(team_id = %self.id, "refreshing team from teams service");

        let record = match self.upstream.fetch_team(&self.id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::info!(team_id = %self.id, "teams service does not know team");
                // With no stored snapshot the mark has nothing left to force.
                if matches!(self.store.load(&self.id).await, Ok(None)) {
                    clear_mark(&self.invalidated, &self.id, self.started_at_seq);
                }
                return Ok(None);
            }
            Err(e) => return Err(RefreshFailure::Upstream(e.to_string())),
        };

        if let Err(e) = record.validate() {
            return Err(RefreshFailure::Upstream(format!(
                "teams service returned an invalid team: {e}"
            )));
        }
        warn_if_inconsistent(&record);

        let snapshot = self
            .store
            .upsert(&record, self.clock.now())
            .await
            .map_err(|e| RefreshFailure::Persistence(e.to_string()))?;

        // Marks set after this fetch started still apply: the data may
        // predate the change that triggered them.
        clear_mark(&self.invalidated, &self.id, self.started_at_seq);

        tracing::info!(
            team_id = %self.id,
            last_updated = %snapshot.last_updated,
            "team snapshot refreshed"
        );
        Ok(Some(snapshot))
    }
}

fn stale(snapshot: CachedTeamSnapshot) -> TeamLookup {
    TeamLookup {
        snapshot,
        status: CacheStatus::StaleServed,
    }
}

/// Removes the invalidation mark for `id` if it was set at or before
/// sequence `seq`.
fn clear_mark(marks: &Mutex<InvalidationMarks>, id: &TeamId, seq: u64) {
    let mut marks = lock(marks);
    if marks.get(id).is_some_and(|&mark| mark <= seq) {
        marks.remove(id);
    }
}

fn warn_if_inconsistent(team: &TeamRecord) {
    if !team.record_is_consistent() {
        tracing::warn!(
            team_id = %team.id,
            games_played = team.games_played,
            games_won = team.games_won,
            games_lost = team.games_lost,
            "team record has more wins and losses than games played"
        );
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration as StdDuration;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use tokio::sync::Semaphore;

    use super::*;
    use crate::domain::ManualClock;
    use crate::persistence::MemoryPersistence;
    use crate::upstream::UpstreamError;

    const TTL_SECS: u64 = 60;

    /// Teams service double: returns a configurable answer, counts calls,
    /// and optionally blocks each call until a permit is released.
    #[derive(Debug)]
    struct StubUpstream {
        answer: Mutex<Result<Option<TeamRecord>, UpstreamError>>,
        calls: AtomicUsize,
        gate: Option<Arc<Semaphore>>,
    }

    impl StubUpstream {
        fn answering(answer: Result<Option<TeamRecord>, UpstreamError>) -> Self {
            Self {
                answer: Mutex::new(answer),
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }

        fn gated(answer: Result<Option<TeamRecord>, UpstreamError>, gate: Arc<Semaphore>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::answering(answer)
            }
        }

        fn set_answer(&self, answer: Result<Option<TeamRecord>, UpstreamError>) {
            *lock(&self.answer) = answer;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TeamsUpstream for StubUpstream {
        async fn fetch_team(&self, _id: &TeamId) -> Result<Option<TeamRecord>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate
                && let Ok(permit) = gate.acquire().await
            {
                permit.forget();
            }
            lock(&self.answer).clone()
        }
    }

    struct Fixture {
        cache: Arc<TeamCache>,
        upstream: Arc<StubUpstream>,
        clock: Arc<ManualClock>,
        store: Arc<MemoryPersistence>,
    }

    fn fixture(upstream: StubUpstream) -> Fixture {
        let upstream = Arc::new(upstream);
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = Arc::new(MemoryPersistence::new());
        let cache = Arc::new(TeamCache::new(
            Arc::clone(&store) as Arc<dyn SnapshotStore>,
            Arc::clone(&upstream) as Arc<dyn TeamsUpstream>,
            Arc::clone(&clock) as Arc<dyn Clock>,
            &CacheConfig {
                ttl: StdDuration::from_secs(TTL_SECS),
            },
        ));
        Fixture {
            cache,
            upstream,
            clock,
            store,
        }
    }

    fn lakers(played: u32, won: u32, lost: u32) -> TeamRecord {
        TeamRecord::new("T1", "Lakers").with_record(played, won, lost)
    }

    fn unreachable() -> Result<Option<TeamRecord>, UpstreamError> {
        Err(UpstreamError::Unavailable("connection refused".to_string()))
    }

    fn past_ttl() -> Duration {
        Duration::seconds(i64::try_from(TTL_SECS).unwrap_or(i64::MAX) + 1)
    }

    #[tokio::test]
    async fn get_within_ttl_returns_upserted_snapshot_unchanged() {
        let f = fixture(StubUpstream::answering(unreachable()));
        let Ok(written) = f.cache.upsert(&lakers(10, 7, 3)).await else {
            panic!("upsert failed");
        };

        f.clock.advance(Duration::seconds(30));
        let Ok(first) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("get failed");
        };
        let Ok(second) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("get failed");
        };

        assert_eq!(first.status, CacheStatus::Hit);
        assert_eq!(first.snapshot, written);
        assert_eq!(second.snapshot.last_updated, written.last_updated);
        assert_eq!(f.upstream.calls(), 0);
    }

    #[tokio::test]
    async fn lakers_scenario_refreshes_after_ttl() {
        let f = fixture(StubUpstream::answering(unreachable()));
        let Ok(written) = f.cache.upsert(&lakers(10, 7, 3)).await else {
            panic!("upsert failed");
        };

        let Ok(within) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("get failed");
        };
        assert_eq!(within.snapshot, written);

        f.clock.advance(past_ttl());
        f.upstream.set_answer(Ok(Some(lakers(11, 8, 3))));

        let Ok(after) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("get failed");
        };
        assert_eq!(after.status, CacheStatus::Refreshed);
        assert_eq!(after.snapshot.team.games_played, 11);
        assert!(after.snapshot.last_updated > written.last_updated);
        assert_eq!(f.upstream.calls(), 1);
    }

    #[tokio::test]
    async fn stale_snapshot_served_when_upstream_down() {
        let f = fixture(StubUpstream::answering(unreachable()));
        let Ok(written) = f.cache.upsert(&lakers(10, 7, 3)).await else {
            panic!("upsert failed");
        };
        f.clock.advance(past_ttl());

        let Ok(lookup) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("stale read should succeed");
        };
        assert!(lookup.is_stale_served());
        assert_eq!(lookup.snapshot, written);

        let Ok(Some(stored)) = f.store.load(&TeamId::from("T1")).await else {
            panic!("snapshot should remain stored");
        };
        assert_eq!(stored.last_updated, written.last_updated);
    }

    #[tokio::test]
    async fn unknown_team_with_upstream_down_is_unavailable() {
        let f = fixture(StubUpstream::answering(unreachable()));
        let result = f.cache.get(&TeamId::from("ghost")).await;
        assert!(matches!(
            result,
            Err(ReportsError::UpstreamUnavailable { ref team_id, .. }) if team_id.as_str() == "ghost"
        ));
    }

    #[tokio::test]
    async fn unknown_team_everywhere_is_not_found() {
        let f = fixture(StubUpstream::answering(Ok(None)));
        let result = f.cache.get(&TeamId::from("ghost")).await;
        assert!(matches!(result, Err(ReportsError::TeamNotFound(_))));
        assert!(f.store.is_empty().await);
    }

    #[tokio::test]
    async fn team_unknown_upstream_but_cached_is_served_stale() {
        let f = fixture(StubUpstream::answering(Ok(None)));
        let _ = f.cache.upsert(&lakers(10, 7, 3)).await;
        f.clock.advance(past_ttl());

        let Ok(lookup) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("cached snapshot should be served");
        };
        assert_eq!(lookup.status, CacheStatus::StaleServed);
    }

    #[tokio::test]
    async fn miss_fetches_once_then_hits() {
        let f = fixture(StubUpstream::answering(Ok(Some(lakers(3, 2, 1)))));

        let Ok(first) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("first get failed");
        };
        let Ok(second) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("second get failed");
        };

        assert_eq!(first.status, CacheStatus::Refreshed);
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(first.snapshot, second.snapshot);
        assert_eq!(f.upstream.calls(), 1);
        assert_eq!(f.cache.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn upsert_twice_keeps_one_row() {
        let f = fixture(StubUpstream::answering(unreachable()));
        let _ = f.cache.upsert(&lakers(10, 7, 3)).await;
        let _ = f.cache.upsert(&lakers(10, 7, 3)).await;

        assert_eq!(f.store.len().await, 1);
        assert_eq!(f.cache.list().await.unwrap_or_default().len(), 1);
    }

    #[tokio::test]
    async fn upsert_rejects_blank_name() {
        let f = fixture(StubUpstream::answering(unreachable()));
        let result = f.cache.upsert(&TeamRecord::new("T1", " ")).await;
        assert!(matches!(result, Err(ReportsError::InvalidRequest(_))));
        assert!(f.store.is_empty().await);
    }

    #[tokio::test]
    async fn inconsistent_record_is_stored_as_received() {
        let f = fixture(StubUpstream::answering(unreachable()));
        let Ok(snapshot) = f.cache.upsert(&lakers(1, 5, 5)).await else {
            panic!("soft invariant must not reject");
        };
        assert_eq!(snapshot.team.games_won, 5);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch_within_ttl() {
        let f = fixture(StubUpstream::answering(Ok(Some(lakers(12, 9, 3)))));
        let _ = f.cache.upsert(&lakers(10, 7, 3)).await;

        f.cache.invalidate(&TeamId::from("T1"));
        let Ok(lookup) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("get failed");
        };
        assert_eq!(lookup.status, CacheStatus::Refreshed);
        assert_eq!(lookup.snapshot.team.games_played, 12);

        let Ok(again) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("get failed");
        };
        assert_eq!(again.status, CacheStatus::Hit);
        assert_eq!(f.upstream.calls(), 1);
    }

    #[tokio::test]
    async fn invalidated_snapshot_is_fallback_when_upstream_down() {
        let f = fixture(StubUpstream::answering(unreachable()));
        let _ = f.cache.upsert(&lakers(10, 7, 3)).await;
        f.cache.invalidate(&TeamId::from("T1"));

        let Ok(lookup) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("stale fallback expected");
        };
        assert!(lookup.is_stale_served());

        // The mark survives the failed refresh.
        let Ok(lookup) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("stale fallback expected");
        };
        assert!(lookup.is_stale_served());
        assert_eq!(f.upstream.calls(), 2);
    }

    #[tokio::test]
    async fn invalidating_unknown_team_leaves_no_mark() {
        let f = fixture(StubUpstream::answering(Ok(None)));
        f.cache.invalidate(&TeamId::from("ghost"));
        assert_eq!(f.cache.invalidation_mark_count(), 1);

        let result = f.cache.get(&TeamId::from("ghost")).await;
        assert!(matches!(result, Err(ReportsError::TeamNotFound(_))));
        assert_eq!(f.cache.invalidation_mark_count(), 0);
    }

    #[tokio::test]
    async fn deleted_upstream_team_keeps_its_mark() {
        let f = fixture(StubUpstream::answering(Ok(None)));
        let _ = f.cache.upsert(&lakers(10, 7, 3)).await;
        f.cache.invalidate(&TeamId::from("T1"));

        let Ok(lookup) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("stale fallback expected");
        };
        assert!(lookup.is_stale_served());
        assert_eq!(f.cache.invalidation_mark_count(), 1);
    }

    #[tokio::test]
    async fn invalidate_all_marks_every_snapshot() {
        let f = fixture(StubUpstream::answering(Ok(Some(lakers(1, 1, 0)))));
        let _ = f.cache.upsert(&lakers(10, 7, 3)).await;
        let _ = f.cache.upsert(&TeamRecord::new("T2", "Celtics")).await;

        assert_eq!(f.cache.invalidate_all().await.unwrap_or_default(), 2);
        let Ok(lookup) = f.cache.get(&TeamId::from("T2")).await else {
            panic!("get failed");
        };
        assert_eq!(lookup.status, CacheStatus::Refreshed);
    }

    #[tokio::test]
    async fn concurrent_gets_share_one_fetch() {
        let gate = Arc::new(Semaphore::new(0));
        let f = fixture(StubUpstream::gated(
            Ok(Some(lakers(5, 3, 2))),
            Arc::clone(&gate),
        ));

        let mut waiters = Vec::new();
        for _ in 0..5 {
            let cache = Arc::clone(&f.cache);
            waiters.push(tokio::spawn(async move {
                cache.get(&TeamId::from("T1")).await
            }));
        }

        tokio::time::sleep(StdDuration::from_millis(50)).await;
        assert_eq!(f.upstream.calls(), 1);
        assert_eq!(f.cache.in_flight_count(), 1);

        gate.add_permits(1);
        for waiter in waiters {
            let Ok(Ok(lookup)) = waiter.await else {
                panic!("waiter failed");
            };
            assert_eq!(lookup.status, CacheStatus::Refreshed);
            assert_eq!(lookup.snapshot.team.games_played, 5);
        }
        assert_eq!(f.upstream.calls(), 1);
        assert_eq!(f.store.len().await, 1);
    }

    #[tokio::test]
    async fn cancelled_waiter_does_not_cancel_fetch() {
        let gate = Arc::new(Semaphore::new(0));
        let f = fixture(StubUpstream::gated(
            Ok(Some(lakers(5, 3, 2))),
            Arc::clone(&gate),
        ));

        let cancelled = {
            let cache = Arc::clone(&f.cache);
            tokio::spawn(async move { cache.get(&TeamId::from("T1")).await })
        };
        let survivor = {
            let cache = Arc::clone(&f.cache);
            tokio::spawn(async move { cache.get(&TeamId::from("T1")).await })
        };

        tokio::time::sleep(StdDuration::from_millis(50)).await;
        cancelled.abort();
        let _ = cancelled.await;

        gate.add_permits(1);
        let Ok(Ok(lookup)) = survivor.await else {
            panic!("surviving waiter failed");
        };
        assert_eq!(lookup.status, CacheStatus::Refreshed);
        assert_eq!(f.upstream.calls(), 1);
        assert!(matches!(f.store.load(&TeamId::from("T1")).await, Ok(Some(_))));
    }

    #[tokio::test]
    async fn invalidation_during_fetch_survives_refresh() {
        let gate = Arc::new(Semaphore::new(0));
        let f = fixture(StubUpstream::gated(
            Ok(Some(lakers(5, 3, 2))),
            Arc::clone(&gate),
        ));

        let pending = {
            let cache = Arc::clone(&f.cache);
            tokio::spawn(async move { cache.get(&TeamId::from("T1")).await })
        };
        tokio::time::sleep(StdDuration::from_millis(50)).await;

        // The team changes while the fetch is still waiting on the Teams
        // service.
        f.cache.invalidate(&TeamId::from("T1"));
        gate.add_permits(1);
        let Ok(Ok(first)) = pending.await else {
            panic!("first get failed");
        };
        assert_eq!(first.status, CacheStatus::Refreshed);

        gate.add_permits(1);
        let Ok(second) = f.cache.get(&TeamId::from("T1")).await else {
            panic!("second get failed");
        };
        assert_eq!(second.status, CacheStatus::Refreshed);
        assert_eq!(f.upstream.calls(), 2);
    }

    #[test]
    fn cache_status_names() {
        assert_eq!(CacheStatus::Hit.as_str(), "hit");
        assert_eq!(CacheStatus::Refreshed.as_str(), "refreshed");
        assert_eq!(CacheStatus::StaleServed.as_str(), "stale_served");
    }
}
