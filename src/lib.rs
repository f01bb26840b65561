//! # courtside-reports
//!
//! Reports service for the basketball scoreboard.
//!
//! The service keeps a local read-cache of team data owned by the Teams
//! service so reports keep working, with bounded staleness, when the Teams
//! service is slow or down. Reports are built from the cache and appended
//! to a history log.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP), Teams service events
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── ReportService (service/)
//!     ├── TeamCache (service/) ◄── invalidation listener ◄── EventBus (domain/)
//!     │     ├── TeamsUpstream (upstream/) ──► Teams service
//!     │     └── SnapshotStore / ReportStore (persistence/)
//!     │
//!     ├── IdentityProviders (identity/) ──► GitHub, Facebook
//!     │
//!     └── PostgreSQL Persistence (or in-memory)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod persistence;
pub mod service;
pub mod upstream;
