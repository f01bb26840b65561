//! Report history DTOs.

use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for `GET /reports/history`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Maximum number of records (1..=50, default 50).
    #[serde(default)]
    pub limit: Option<u32>,
}
