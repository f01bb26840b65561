//! Identity exchange DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for `POST /identity/{provider}/exchange`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExchangeCodeRequest {
    /// Authorization code from the provider's OAuth redirect.
    pub code: String,
}
