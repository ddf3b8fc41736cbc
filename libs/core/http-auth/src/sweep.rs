use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::revocation::RevocationList;
use crate::session::SessionStore;

/// Spawn the periodic expiry sweeper for sessions and revocations.
///
/// Runs on its own schedule, independent of the access pattern, so the stores
/// stay bounded even if expired records are never touched again. Stops when
/// the shutdown channel fires.
pub fn spawn_sweeper(
    sessions: SessionStore,
    revocations: RevocationList,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // Don't burn a sweep at startup before anything can be expired.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let swept_sessions = sessions.sweep().await;
                    let swept_revocations = revocations.sweep().await;
                    if swept_sessions > 0 || swept_revocations > 0 {
                        debug!(
                            sessions = swept_sessions,
                            revocations = swept_revocations,
                            "Expiry sweep completed"
                        );
                    }
                }
                _ = shutdown.recv() => {
                    info!("Expiry sweeper stopping");
                    break;
                }
            }
        }
    })
}
