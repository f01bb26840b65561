//! Team records and their cached, timestamped snapshots.
//!
//! [`TeamRecord`] is the team as the Teams service describes it.
//! [`CachedTeamSnapshot`] is a record plus the `last_updated` stamp the
//! store assigns on every write; it is the only thing the read-cache hands
//! out.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::TeamId;
use crate::error::ReportsError;

/// Denormalized team data as owned by the Teams service.
///
/// Construct with [`TeamRecord::new`], which applies the field defaults
/// (descriptive fields absent, counters zero), then chain the `with_*`
/// setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    /// Teams service identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Home city.
    #[serde(default)]
    pub city: Option<String>,
    /// Head coach.
    #[serde(default)]
    pub coach: Option<String>,
    /// Logo image URL.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Games played.
    #[serde(default)]
    pub games_played: u32,
    /// Games won.
    #[serde(default)]
    pub games_won: u32,
    /// Games lost.
    #[serde(default)]
    pub games_lost: u32,
}

impl TeamRecord {
    /// Creates a record with only the required fields set.
    #[must_use]
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            city: None,
            coach: None,
            logo_url: None,
            games_played: 0,
            games_won: 0,
            games_lost: 0,
        }
    }

    /// Sets the home city.
    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Sets the head coach.
    #[must_use]
    pub fn with_coach(mut self, coach: impl Into<String>) -> Self {
        self.coach = Some(coach.into());
        self
    }

    /// Sets the logo URL.
    #[must_use]
    pub fn with_logo_url(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }

    /// Sets the played/won/lost counters.
    #[must_use]
    pub const fn with_record(mut self, played: u32, won: u32, lost: u32) -> Self {
        self.games_played = played;
        self.games_won = won;
        self.games_lost = lost;
        self
    }

    /// Checks the hard invariants: a non-blank id and a non-blank name.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::InvalidRequest`] naming the offending field.
    pub fn validate(&self) -> Result<(), ReportsError> {
        if self.id.is_blank() {
            return Err(ReportsError::InvalidRequest(
                "team id must not be blank".to_string(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(ReportsError::InvalidRequest(format!(
                "team {} has a blank name",
                self.id
            )));
        }
        Ok(())
    }

    /// Whether `games_won + games_lost <= games_played`.
    ///
    /// Soft invariant: inconsistent records are stored as received and only
    /// flagged.
    #[must_use]
    pub const fn record_is_consistent(&self) -> bool {
        (self.games_won as u64) + (self.games_lost as u64) <= self.games_played as u64
    }

    /// Fraction of played games that were won, `0.0` when none were played.
    #[must_use]
    pub fn win_percentage(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        f64::from(self.games_won) / f64::from(self.games_played)
    }
}

/// A [`TeamRecord`] as held by the read-cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CachedTeamSnapshot {
    /// The cached team data.
    #[serde(flatten)]
    pub team: TeamRecord,
    /// Time of the write that produced this snapshot. Strictly increasing
    /// across writes of the same team.
    pub last_updated: DateTime<Utc>,
}

impl CachedTeamSnapshot {
    /// Identifier of the cached team.
    #[must_use]
    pub const fn id(&self) -> &TeamId {
        &self.team.id
    }

    /// Whether the snapshot is older than `ttl` at time `now`.
    ///
    /// The comparison is strict: a snapshot exactly `ttl` old is still
    /// fresh.
    #[must_use]
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.last_updated) > ttl
    }
}

/// Computes the `last_updated` stamp for a write at `now`, given the stamp
/// of the row being replaced.
///
/// Returns `now` unless that would not move strictly past `previous`, in
/// which case the previous stamp plus one microsecond is used. Microseconds
/// are the resolution of a Postgres `timestamptz`.
#[must_use]
pub fn next_write_stamp(previous: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn lakers() -> TeamRecord {
        TeamRecord::new("T1", "Lakers")
            .with_city("Los Angeles")
            .with_record(10, 7, 3)
    }

    #[test]
    fn new_applies_defaults() {
        let team = TeamRecord::new("T2", "Celtics");
        assert_eq!(team.city, None);
        assert_eq!(team.coach, None);
        assert_eq!(team.logo_url, None);
        assert_eq!(team.games_played, 0);
        assert_eq!(team.games_won, 0);
        assert_eq!(team.games_lost, 0);
    }

    #[test]
    fn validate_rejects_blank_name_and_id() {
        assert!(lakers().validate().is_ok());
        assert!(TeamRecord::new("T1", "  ").validate().is_err());
        assert!(TeamRecord::new("", "Lakers").validate().is_err());
    }

    #[test]
    fn record_consistency_is_reported() {
        assert!(lakers().record_is_consistent());
        assert!(!TeamRecord::new("T3", "Bulls").with_record(2, 2, 1).record_is_consistent());
    }

    #[test]
    fn win_percentage_handles_zero_games() {
        assert!((lakers().win_percentage() - 0.7).abs() < f64::EPSILON);
        assert!(TeamRecord::new("T4", "Heat").win_percentage().abs() < f64::EPSILON);
    }

    #[test]
    fn staleness_is_strictly_greater_than_ttl() {
        let written = Utc::now();
        let snapshot = CachedTeamSnapshot {
            team: lakers(),
            last_updated: written,
        };
        let ttl = Duration::seconds(60);
        assert!(!snapshot.is_stale(written + ttl, ttl));
        assert!(snapshot.is_stale(written + ttl + Duration::milliseconds(1), ttl));
    }

    #[test]
    fn write_stamp_moves_strictly_forward() {
        let now = Utc::now();
        assert_eq!(next_write_stamp(None, now), now);
        assert_eq!(next_write_stamp(Some(now - Duration::seconds(1)), now), now);
        assert!(next_write_stamp(Some(now), now) > now);
        let future = now + Duration::seconds(5);
        assert!(next_write_stamp(Some(future), now) > future);
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let json = serde_json::json!({
            "id": 12,
            "name": "Lakers",
            "gamesPlayed": 3,
        });
        let Ok(team) = serde_json::from_value::<TeamRecord>(json) else {
            panic!("payload should deserialize");
        };
        assert_eq!(team.id, TeamId::from("12"));
        assert_eq!(team.games_played, 3);
        assert_eq!(team.games_won, 0);
    }

    #[test]
    fn snapshot_serializes_flat() {
        let snapshot = CachedTeamSnapshot {
            team: lakers(),
            last_updated: Utc::now(),
        };
        let value = serde_json::to_value(&snapshot).unwrap_or_default();
        assert_eq!(value["name"], "Lakers");
        assert!(value.get("lastUpdated").is_some());
        assert!(value.get("team").is_none());
    }
}
