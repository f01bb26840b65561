//! Team DTOs for the read-cache endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{CachedTeamSnapshot, TeamId, TeamRecord};
use crate::service::{CacheStatus, TeamLookup};

/// Response body for `GET /teams/{id}`: the snapshot plus how it was
/// obtained. Keys are camelCase throughout, matching the snapshot.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    /// Cached team data and its `lastUpdated` stamp.
    #[serde(flatten)]
    pub snapshot: CachedTeamSnapshot,
    /// `hit`, `refreshed` or `stale_served`.
    pub cache_status: CacheStatus,
}

impl From<TeamLookup> for TeamResponse {
    fn from(lookup: TeamLookup) -> Self {
        Self {
            snapshot: lookup.snapshot,
            cache_status: lookup.status,
        }
    }
}

/// Request body for `PUT /cache/teams/{id}`.
///
/// `id` may be omitted; when present it is ignored in favour of the path.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertTeamRequest {
    /// Ignored; the path id is authoritative.
    #[serde(default)]
    pub id: Option<TeamId>,
    /// Display name (required, non-blank).
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

impl UpsertTeamRequest {
    /// Builds the record to store under `id`.
    #[must_use]
    pub fn into_record(self, id: TeamId) -> TeamRecord {
        if let Some(body_id) = &self.id
            && body_id != &id
        {
            tracing::debug!(path_id = %id, %body_id, "body id ignored; path id wins");
        }
        TeamRecord {
            id,
            name: self.name,
            city: self.city,
            coach: self.coach,
            logo_url: self.logo_url,
            games_played: self.games_played,
            games_won: self.games_won,
            games_lost: self.games_lost,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn team_response_keys_are_camel_case() {
        let response = TeamResponse::from(TeamLookup {
            snapshot: CachedTeamSnapshot {
                team: TeamRecord::new("T1", "Lakers"),
                last_updated: Utc::now(),
            },
            status: CacheStatus::StaleServed,
        });
        let value = serde_json::to_value(&response).unwrap_or_default();
        assert_eq!(value["cacheStatus"], "stale_served");
        assert_eq!(value["gamesPlayed"], 0);
        assert!(value.get("lastUpdated").is_some());
        assert!(value.get("cache_status").is_none());
    }

    #[test]
    fn path_id_wins_over_body_id() {
        let Ok(req) = serde_json::from_str::<UpsertTeamRequest>(
            r#"{"id":"other","name":"Lakers","gamesPlayed":10,"gamesWon":7,"gamesLost":3}"#,
        ) else {
            panic!("body should parse");
        };
        let record = req.into_record(TeamId::from("T1"));
        assert_eq!(record.id.as_str(), "T1");
        assert_eq!(record.games_played, 10);
        assert_eq!(record.city, None);
    }
}
