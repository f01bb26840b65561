//! `reqwest` client for the Teams service.
//!
//! `GET {base_url}/{id}` answers either a bare team object or one wrapped
//! in `{ "data": { ... } }`. The Teams service names its fields in Spanish
//! (`nombre`, `ciudad`, `partidosJugados`, ...); the English camelCase names
//! are accepted as well.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use super::{TeamsUpstream, UpstreamError};
use crate::config::UpstreamConfig;
use crate::domain::{TeamId, TeamRecord};

/// HTTP implementation of [`TeamsUpstream`].
#[derive(Debug, Clone)]
pub struct HttpTeamsClient {
    client: Client,
    base_url: Url,
}

impl HttpTeamsClient {
    /// Builds a client with the configured base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Unavailable`] if the base URL does not parse
    /// or cannot carry path segments, or the HTTP client cannot be built.
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base_url = Url::parse(&config.teams_service_url).map_err(|e| {
            UpstreamError::Unavailable(format!(
                "invalid teams service url {:?}: {e}",
                config.teams_service_url
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Unavailable(format!(
                "teams service url {:?} cannot carry a path",
                config.teams_service_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn team_url(&self, id: &TeamId) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| UpstreamError::Unavailable("teams service url has no path".to_string()))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl TeamsUpstream for HttpTeamsClient {
    async fn fetch_team(&self, id: &TeamId) -> Result<Option<TeamRecord>, UpstreamError> {
        let url = self.team_url(id)?;
        tracing::debug!(team_id = %id, %url, "fetching team from teams service");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(UpstreamError::UnexpectedStatus(status.as_u16()));
        }

        let envelope: TeamEnvelope = response
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        let payload = envelope.into_payload();

        if let Some(returned) = payload.id.as_ref()
            && returned != id
        {
            tracing::warn!(
                team_id = %id,
                returned_id = %returned,
                "teams service answered with a different id; keeping the requested one"
            );
        }

        Ok(Some(payload.into_record(id.clone())))
    }
}

/// Response body: bare team object or `{ "data": team }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TeamEnvelope {
    Wrapped { data: TeamPayload },
    Bare(TeamPayload),
}

impl TeamEnvelope {
    fn into_payload(self) -> TeamPayload {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}

/// Team object as the Teams service serializes it. Counters may be absent
/// or `null`; both read as zero. The requested id is authoritative, so the
/// body's own `id` is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamPayload {
    #[serde(default)]
    id: Option<TeamId>,
    #[serde(alias = "nombre")]
    name: String,
    #[serde(default, alias = "ciudad")]
    city: Option<String>,
    #[serde(default, alias = "entrenador")]
    coach: Option<String>,
    #[serde(default, alias = "logo")]
    logo_url: Option<String>,
    #[serde(default, alias = "partidosJugados")]
    games_played: Option<u32>,
    #[serde(default, alias = "partidosGanados")]
    games_won: Option<u32>,
    #[serde(default, alias = "partidosPerdidos")]
    games_lost: Option<u32>,
}

impl TeamPayload {
    fn into_record(self, id: TeamId) -> TeamRecord {
        TeamRecord {
            id,
            name: self.name,
            city: self.city,
            coach: self.coach,
            logo_url: self.logo_url,
            games_played: self.games_played.unwrap_or(0),
            games_won: self.games_won.unwrap_or(0),
            games_lost: self.games_lost.unwrap_or(0),
        }
    }
}
