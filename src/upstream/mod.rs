//! Teams service collaborator.
//!
//! [`TeamsUpstream`] is the lookup-by-identifier operation the read-cache
//! calls on a miss or a stale hit. [`http::HttpTeamsClient`] is the
//! production implementation over `reqwest`.

pub mod http;

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::{TeamId, TeamRecord};

pub use http::HttpTeamsClient;

/// Failure talking to the Teams service. Every variant means "no usable
/// answer"; an unknown team is not an error (see
/// [`TeamsUpstream::fetch_team`]).
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    /// Transport failure, timeout, or client construction failure.
    #[error("teams service unreachable: {0}")]
    Unavailable(String),

    /// The service answered with a status other than 2xx or 404.
    #[error("teams service returned status {0}")]
    UnexpectedStatus(u16),

    /// A 2xx body that does not describe a team.
    #[error("malformed team payload: {0}")]
    Malformed(String),
}

/// Authoritative source of team data.
#[async_trait]
pub trait TeamsUpstream: Send + Sync + Debug {
    /// Fetches the current state of a team.
    ///
    /// Returns `Ok(None)` when the Teams service does not know `id`.
    async fn fetch_team(&self, id: &TeamId) -> Result<Option<TeamRecord>, UpstreamError>;
}
