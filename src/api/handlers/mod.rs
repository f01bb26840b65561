//! REST endpoint handlers organized by resource.

pub mod cache;
pub mod events;
pub mod identity;
pub mod reports;
pub mod system;
pub mod teams;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(teams::routes())
        .merge(cache::routes())
        .merge(events::routes())
        .merge(reports::routes())
        .merge(identity::routes())
}
