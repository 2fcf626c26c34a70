//! Periodic liveness sweep over the connection registry.
//!
//! Every interval each peer either proved itself live since the previous
//! pass (a pong, heartbeat, or any liveness traffic arrived) or it did
//! not. Proven peers get their flag cleared and a fresh transport ping;
//! silent peers are closed and evicted. A peer that goes quiet is
//! therefore detected within two intervals.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::service::RelayService;

/// Spawns the background sweep task.
///
/// The task runs for the lifetime of the process; the returned handle is
/// kept only so callers can abort it in tests. `period` must be nonzero,
/// which [`crate::config::RelayConfig::from_env`] guarantees for the
/// configured interval.
pub fn spawn_sweeper(relay: Arc<RelayService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately; consume it so the first
        // real pass happens a full period after startup.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = relay.sweep().await;
            if evicted > 0 {
                tracing::debug!(evicted, "liveness sweep finished");
            }
        }
    })
}
