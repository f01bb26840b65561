//! Domain layer: team identity, cached snapshots, and the team event system.
//!
//! This module contains the service-side domain model: the Teams service
//! identifier, the team record and its cached snapshot, the lifecycle
//! events the Teams service emits, the event bus that fans them out, and
//! the clock used for staleness decisions.

pub mod clock;
pub mod event_bus;
pub mod team_event;
pub mod team_id;
pub mod team_snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use event_bus::EventBus;
pub use team_event::{TeamEvent, TeamEventKind};
pub use team_id::TeamId;
pub use team_snapshot::{CachedTeamSnapshot, TeamRecord, next_write_stamp};
