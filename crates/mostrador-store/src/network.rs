//! # Network Status
//!
//! Connectivity as a watch channel plus the background monitor task.
//!
//! ## Transitions
//! ```text
//! online ──► offline   writes start queueing; reads serve cached data
//! offline ──► online   replay pending sales, then refresh collections
//! ```
//! The offline→online edge is the only one with side effects, and the
//! replay runs before the refresh so a reloaded sales list already
//! contains the replayed sales.
//!
//! Status flips come from two directions: gateway calls that fail with a
//! connectivity error mark us offline immediately, and the monitor's
//! periodic probe brings us back (or confirms a UI-reported change).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::state::AppStore;

/// Default reachability probe interval.
const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(15);

// =============================================================================
// Connectivity
// =============================================================================

/// Shared online/offline flag, observable through a watch channel.
#[derive(Debug)]
pub struct Connectivity {
    tx: watch::Sender<bool>,
}

impl Connectivity {
    /// Creates the flag with an initial assumption.
    pub fn new(initially_online: bool) -> Arc<Self> {
        let (tx, _) = watch::channel(initially_online);
        Arc::new(Connectivity { tx })
    }

    /// Current status.
    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Flips the status. Observers are only notified on an actual change.
    pub fn set_online(&self, online: bool) {
        self.tx.send_if_modified(|current| {
            if *current != online {
                *current = online;
                true
            } else {
                false
            }
        });
    }

    /// Subscribes to status changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

// =============================================================================
// Network Monitor
// =============================================================================

/// Background task that probes the remote service and reacts to
/// connectivity edges.
pub struct NetworkMonitor {
    store: AppStore,
    probe_interval: Duration,
}

impl NetworkMonitor {
    pub fn new(store: AppStore) -> Self {
        NetworkMonitor {
            store,
            probe_interval: DEFAULT_PROBE_INTERVAL,
        }
    }

    /// Overrides the probe interval.
    pub fn probe_interval(mut self, interval: Duration) -> Self {
        self.probe_interval = interval;
        self
    }

    /// Spawns the monitor loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let connectivity = self.store.connectivity();
        let mut rx = connectivity.subscribe();
        let mut was_online = connectivity.is_online();

        let mut ticker = tokio::time::interval(self.probe_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; skip it so startup load_all
        // runs before the first probe can race it.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let reachable = self.store.remote().ping().await;
                    connectivity.set_online(reachable);
                }
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = *rx.borrow_and_update();
                    if online && !was_online {
                        info!("Connectivity restored");
                        if let Err(err) = self.store.sync_pending_sales().await {
                            warn!(error = %err, "Pending sale replay failed");
                        }
                        if let Err(err) = self.store.load_all().await {
                            warn!(error = %err, "Post-reconnect refresh failed");
                        }
                    } else if !online && was_online {
                        info!("Connectivity lost, entering offline mode");
                    }
                    was_online = online;
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_online_notifies_only_on_change() {
        let connectivity = Connectivity::new(true);
        let mut rx = connectivity.subscribe();

        connectivity.set_online(true); // no change
        assert!(!rx.has_changed().unwrap());

        connectivity.set_online(false);
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
        assert!(!connectivity.is_online());
    }
}
