//! Data Transfer Objects for REST request/response serialization.
//!
//! Team payloads use the Teams service's camelCase field names so a body
//! fetched from there can be replayed against the cache endpoints as-is.

pub mod common_dto;
pub mod event_dto;
pub mod identity_dto;
pub mod report_dto;
pub mod team_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use identity_dto::*;
pub use report_dto::*;
pub use team_dto::*;
