//! Service error types with HTTP status code mapping.
//!
//! [`ReportsError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::TeamId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "team not found: 42",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                    |
/// |-----------|-----------------|--------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request                |
/// | 2000–2999 | Not Found       | 404 Not Found                  |
/// | 3000–3999 | Server/Upstream | 500 / 502 / 503                |
#[derive(Debug, thiserror::Error)]
pub enum ReportsError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No identity provider is registered under the requested name.
    #[error("unknown identity provider: {0}")]
    UnknownProvider(String),

    /// The team is unknown to both the cache and the Teams service.
    #[error("team not found: {0}")]
    TeamNotFound(TeamId),

    /// Report history entry with the given ID was not found.
    #[error("report not found: {0}")]
    ReportNotFound(i64),

    /// The Teams service could not be reached and no cached snapshot exists.
    #[error("teams service unavailable for team {team_id}: {reason}")]
    UpstreamUnavailable {
        /// Team that was being looked up.
        team_id: TeamId,
        /// Underlying failure description.
        reason: String,
    },

    /// An identity provider rejected or failed the code exchange.
    #[error("identity provider error: {0}")]
    IdentityProviderError(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReportsError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::UnknownProvider(_) => 1002,
            Self::TeamNotFound(_) => 2001,
            Self::ReportNotFound(_) => 2002,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::UpstreamUnavailable { .. } => 3002,
            Self::IdentityProviderError(_) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::UnknownProvider(_) => StatusCode::BAD_REQUEST,
            Self::TeamNotFound(_) | Self::ReportNotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::IdentityProviderError(_) => StatusCode::BAD_GATEWAY,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ReportsError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for ReportsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_404() {
        let team = ReportsError::TeamNotFound(TeamId::from("T1"));
        assert_eq!(team.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(team.error_code(), 2001);

        let report = ReportsError::ReportNotFound(7);
        assert_eq!(report.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(report.error_code(), 2002);
    }

    #[test]
    fn upstream_unavailable_maps_to_503() {
        let err = ReportsError::UpstreamUnavailable {
            team_id: TeamId::from("T9"),
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.to_string().contains("T9"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn response_carries_status() {
        let response = ReportsError::InvalidRequest("blank name".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
