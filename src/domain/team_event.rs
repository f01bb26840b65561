//! Team lifecycle events published by the Teams service.
//!
//! The Teams service announces creates, updates and deletes. The Reports
//! service receives them through the event ingest endpoint, broadcasts them
//! on the [`super::EventBus`], and the invalidation listener marks the
//! affected snapshot for refetch.
//!
//! On the Teams service's own bus the event kind travels as the routing
//! key (`team.created`, `team.updated`, `team.deleted`) rather than in the
//! body; [`TeamEventKind`] parses those keys.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::TeamId;
use crate::error::ReportsError;

/// Lifecycle step a team event announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamEventKind {
    /// `team.created`
    Created,
    /// `team.updated`
    Updated,
    /// `team.deleted`
    Deleted,
}

impl TeamEventKind {
    /// Returns the snake_case event type string used in tagged bodies.
    #[must_use]
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::Created => "team_created",
            Self::Updated => "team_updated",
            Self::Deleted => "team_deleted",
        }
    }
}

impl FromStr for TeamEventKind {
    type Err = ReportsError;

    /// Accepts `created`, `team.created` and `team_created` (and the same
    /// for updated / deleted), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let step = lowered
            .strip_prefix("team.")
            .or_else(|| lowered.strip_prefix("team_"))
            .unwrap_or(lowered.as_str());
        match step {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "deleted" => Ok(Self::Deleted),
            _ => Err(ReportsError::InvalidRequest(format!(
                "unknown team event kind {s:?}"
            ))),
        }
    }
}

/// Event emitted by the Teams service after a team mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TeamEvent {
    /// A team was registered.
    TeamCreated {
        /// Team identifier.
        team_id: TeamId,
        /// Display name.
        name: String,
        /// Home city.
        city: String,
        /// Logo URL.
        #[serde(default)]
        logo_url: Option<String>,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A team's descriptive data changed.
    TeamUpdated {
        /// Team identifier.
        team_id: TeamId,
        /// Display name.
        name: String,
        /// Home city.
        city: String,
        /// Logo URL.
        #[serde(default)]
        logo_url: Option<String>,
        /// Whether the team is still active.
        is_active: bool,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A team was removed.
    TeamDeleted {
        /// Team identifier.
        team_id: TeamId,
        /// Event timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl TeamEvent {
    /// Returns the team this event refers to.
    #[must_use]
    pub const fn team_id(&self) -> &TeamId {
        match self {
            Self::TeamCreated { team_id, .. }
            | Self::TeamUpdated { team_id, .. }
            | Self::TeamDeleted { team_id, .. } => team_id,
        }
    }

    /// Returns the lifecycle step this event announces.
    #[must_use]
    pub const fn kind(&self) -> TeamEventKind {
        match self {
            Self::TeamCreated { .. } => TeamEventKind::Created,
            Self::TeamUpdated { .. } => TeamEventKind::Updated,
            Self::TeamDeleted { .. } => TeamEventKind::Deleted,
        }
    }

    /// Returns the snake_case event type string.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        self.kind().event_type()
    }

    /// Returns the event timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::TeamCreated { timestamp, .. }
            | Self::TeamUpdated { timestamp, .. }
            | Self::TeamDeleted { timestamp, .. } => *timestamp,
        }
    }
}
