//! Background task turning team events into cache invalidations.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::TeamCache;
use crate::domain::TeamEvent;

/// Spawns the listener that invalidates the cached snapshot named by every
/// [`TeamEvent`] received on `events`.
///
/// If the receiver lags and events are lost, every stored snapshot is
/// invalidated, since the missed team ids are unknown. The task ends when
/// the bus is closed.
pub fn spawn_invalidation_listener(
    cache: Arc<TeamCache>,
    mut events: broadcast::Receiver<TeamEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    tracing::debug!(
                        team_id = %event.team_id(),
                        event_type = event.event_type(),
                        "team event received"
                    );
                    cache.invalidate(event.team_id());
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "team event listener lagged; invalidating all snapshots");
                    if let Err(e) = cache.invalidate_all().await {
                        tracing::error!(error = %e, "failed to invalidate snapshots after lag");
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("team event bus closed; invalidation listener stopping");
                    break;
                }
            }
        }
    })
}
