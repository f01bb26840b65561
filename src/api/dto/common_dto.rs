//! Shared DTO types used across multiple endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::TeamId;
use crate::error::ReportsError;

/// Envelope for list responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListResponse<T> {
    /// Items, in endpoint-specific order.
    pub data: Vec<T>,
    /// Number of items in `data`.
    pub total: usize,
}

impl<T> ListResponse<T> {
    /// Wraps `data`, counting its items.
    #[must_use]
    pub fn new(data: Vec<T>) -> Self {
        Self {
            total: data.len(),
            data,
        }
    }
}

/// Parses a team id taken from a URL path segment.
///
/// # Errors
///
/// Returns [`ReportsError::InvalidRequest`] for a blank id.
pub fn team_id_from_path(raw: String) -> Result<TeamId, ReportsError> {
    let id = TeamId::new(raw);
    if id.is_blank() {
        return Err(ReportsError::InvalidRequest(
            "team id must not be blank".to_string(),
        ));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_response_counts_items() {
        let list = ListResponse::new(vec![1, 2, 3]);
        assert_eq!(list.total, 3);
    }

    #[test]
    fn blank_path_id_is_rejected() {
        assert!(team_id_from_path("  ".to_string()).is_err());
        assert!(matches!(team_id_from_path("T1".to_string()), Ok(id) if id.as_str() == "T1"));
    }
}
