//! Broadcast channel for team events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The event ingest
//! endpoint publishes every [`TeamEvent`] it accepts, and the cache
//! invalidation listener subscribes once at startup.

use tokio::sync::broadcast;

use super::TeamEvent;

/// Broadcast bus for [`TeamEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity.
/// When the ring buffer is full, the oldest events are dropped for lagging
/// receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TeamEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; [`crate::config::ReportsConfig`]
    /// rejects that value at load time.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: TeamEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TeamEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;
    use tokio::sync::broadcast::error::RecvError;

    use super::*;
    use crate::domain::TeamId;

    fn deleted(team_id: &str) -> TeamEvent {
        TeamEvent::TeamDeleted {
            team_id: TeamId::from(team_id),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn event_without_listener_is_dropped() {
        let bus = EventBus::new(4);
        assert_eq!(bus.publish(deleted("T1")), 0);
    }

    #[tokio::test]
    async fn listener_sees_published_team() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        assert_eq!(bus.publish(deleted("T1")), 1);

        let Ok(event) = rx.recv().await else {
            panic!("expected the published event");
        };
        assert_eq!(event.team_id(), &TeamId::from("T1"));
    }

    #[tokio::test]
    async fn slow_listener_is_told_it_lagged() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for id in ["T1", "T2", "T3"] {
            bus.publish(deleted(id));
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
    }
}
