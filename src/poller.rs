//! Recurring snapshot poll
//!
//! One task per session: query the backend on a constant cadence and merge
//! whatever comes back. The first poll fires immediately. A failed poll flips
//! the store's connectivity flag and nothing else; the next successful tick
//! heals it. There is no backoff — the constant cadence is the only retry
//! mechanism in the crate.

use crate::backend::BackendClient;
use crate::store::StateStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

pub(crate) async fn run(
    backend: Arc<dyn BackendClient>,
    store: Arc<StateStore>,
    poll_interval: Duration,
) {
    let mut ticker = interval(poll_interval);
    // A slow poll must not cause a burst of catch-up ticks
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match backend.status().await {
            Ok(snapshot) => store.apply_snapshot(&snapshot),
            Err(e) => {
                tracing::warn!(backend = backend.name(), error = %e, "Status poll failed");
                store.record_poll_failure();
            }
        }
    }
}
