//! Team event ingest DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{TeamEvent, TeamEventKind, TeamId};
use crate::error::ReportsError;

/// Response body for event ingest (202 Accepted).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventAcceptedResponse {
    /// Event type echoed from the request.
    pub event_type: String,
    /// Team the event refers to.
    pub team_id: TeamId,
    /// Number of bus subscribers the event was delivered to.
    pub receivers: usize,
}

/// Event body exactly as the Teams service publishes it: PascalCase keys,
/// with the event kind carried outside the body. Deleted events only carry
/// `TeamId` and `Timestamp`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct RelayedTeamEvent {
    /// Team identifier.
    pub team_id: TeamId,
    /// Display name; required for created and updated events.
    #[serde(default)]
    pub team_name: Option<String>,
    /// Home city.
    #[serde(default)]
    pub city: Option<String>,
    /// Logo URL.
    #[serde(default)]
    pub logo: Option<String>,
    /// Whether the team is still active; absent on created events.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// Event timestamp.
    pub timestamp: DateTime<Utc>,
}

impl RelayedTeamEvent {
    /// Builds the internal event for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportsError::InvalidRequest`] if a created or updated
    /// event has no `TeamName`.
    pub fn into_event(self, kind: TeamEventKind) -> Result<TeamEvent, ReportsError> {
        Ok(match kind {
            TeamEventKind::Created => TeamEvent::TeamCreated {
                name: required_name(self.team_name, kind)?,
                team_id: self.team_id,
                city: self.city.unwrap_or_default(),
                logo_url: self.logo,
                timestamp: self.timestamp,
            },
            TeamEventKind::Updated => TeamEvent::TeamUpdated {
                name: required_name(self.team_name, kind)?,
                team_id: self.team_id,
                city: self.city.unwrap_or_default(),
                logo_url: self.logo,
                is_active: self.is_active.unwrap_or(true),
                timestamp: self.timestamp,
            },
            TeamEventKind::Deleted => TeamEvent::TeamDeleted {
                team_id: self.team_id,
                timestamp: self.timestamp,
            },
        })
    }
}

fn required_name(name: Option<String>, kind: TeamEventKind) -> Result<String, ReportsError> {
    name.ok_or_else(|| {
        ReportsError::InvalidRequest(format!("{} event needs a TeamName", kind.event_type()))
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn relayed(json: &str) -> RelayedTeamEvent {
        let Ok(body) = serde_json::from_str::<RelayedTeamEvent>(json) else {
            panic!("body should deserialize: {json}");
        };
        body
    }

    #[test]
    fn teams_service_update_body_becomes_team_updated() {
        let body = relayed(
            r#"{"TeamId":5,"TeamName":"Lakers","City":"LA","Logo":null,"IsActive":true,"Timestamp":"2024-03-01T00:00:00Z"}"#,
        );
        let Ok(event) = body.into_event(TeamEventKind::Updated) else {
            panic!("update should convert");
        };
        let TeamEvent::TeamUpdated {
            team_id,
            name,
            city,
            logo_url,
            is_active,
            ..
        } = event
        else {
            panic!("expected team_updated");
        };
        assert_eq!(team_id, TeamId::from(5));
        assert_eq!(name, "Lakers");
        assert_eq!(city, "LA");
        assert_eq!(logo_url, None);
        assert!(is_active);
    }

    #[test]
    fn deleted_body_needs_only_id_and_timestamp() {
        let body = relayed(r#"{"TeamId":9,"Timestamp":"2024-03-01T00:00:00Z"}"#);
        let Ok(event) = body.into_event(TeamEventKind::Deleted) else {
            panic!("delete should convert");
        };
        assert_eq!(event.event_type(), "team_deleted");
        assert_eq!(event.team_id(), &TeamId::from(9));
    }

    #[test]
    fn created_without_name_is_rejected() {
        let body = relayed(r#"{"TeamId":9,"Timestamp":"2024-03-01T00:00:00Z"}"#);
        assert!(matches!(
            body.into_event(TeamEventKind::Created),
            Err(ReportsError::InvalidRequest(_))
        ));
    }
}
