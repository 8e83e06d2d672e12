//! Shared session state
//!
//! The single [`ServiceState`] cell for one sync session. Reads are
//! whole-state and atomic; every write replaces the full state through one of
//! the reconciliation transitions. The mutating methods are crate-private —
//! only the poller and the command gateway reach them — so presentation code
//! is limited to `current`, `watch` and `stream` by construction.

use crate::types::{ServiceState, Snapshot};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Owner of the session's [`ServiceState`]
///
/// Backed by a `tokio::sync::watch` channel: readers either grab a clone of
/// the current value or subscribe and get woken on every merge.
pub struct StateStore {
    tx: watch::Sender<ServiceState>,
}

impl StateStore {
    /// Create a store holding the initial state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ServiceState::default());
        Self { tx }
    }

    /// Atomic read of the whole current state
    pub fn current(&self) -> ServiceState {
        self.tx.borrow().clone()
    }

    /// Subscribe to state changes
    ///
    /// The receiver is woken on every merge; `borrow()` on it is a read-only
    /// view of the latest state.
    pub fn watch(&self) -> watch::Receiver<ServiceState> {
        self.tx.subscribe()
    }

    /// State changes as an async stream, starting from the current value
    pub fn stream(&self) -> WatchStream<ServiceState> {
        WatchStream::new(self.tx.subscribe())
    }

    pub(crate) fn apply_snapshot(&self, snapshot: &Snapshot) {
        self.tx
            .send_modify(|state| *state = state.merge_snapshot(snapshot));
        tracing::debug!(
            status = ?snapshot.current_state,
            logs = snapshot.logs.len(),
            "Snapshot merged"
        );
    }

    pub(crate) fn record_poll_failure(&self) {
        self.tx
            .send_modify(|state| *state = state.with_backend_unreachable());
    }

    pub(crate) fn record_command_failure(&self, message: String) {
        tracing::debug!(message = %message, "Command failure recorded");
        self.tx.send_modify(|state| *state = state.with_error(message));
    }

    pub(crate) fn dismiss_error(&self) {
        self.tx
            .send_modify(|state| *state = state.with_error_dismissed());
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InternetStatus, ServiceStatus, WifiStatus};
    use tokio_stream::StreamExt;

    fn running_snapshot() -> Snapshot {
        Snapshot {
            current_state: ServiceStatus::Running,
            wifi_status: WifiStatus::Connected,
            internet_status: InternetStatus::Online,
            last_kick_time_ms: Some(1000),
            interval_seconds: 120,
            logs: vec![],
            error_message: None,
        }
    }

    #[test]
    fn test_store_starts_from_initial_state() {
        let store = StateStore::new();
        assert_eq!(store.current(), ServiceState::default());
    }

    #[test]
    fn test_apply_snapshot_replaces_state() {
        let store = StateStore::new();
        store.apply_snapshot(&running_snapshot());

        let state = store.current();
        assert_eq!(state.status, ServiceStatus::Running);
        assert_eq!(state.wifi_status, WifiStatus::Connected);
        assert!(state.backend_connected);
    }

    #[test]
    fn test_poll_failure_flips_flag_and_nothing_else() {
        let store = StateStore::new();
        store.apply_snapshot(&running_snapshot());

        let before = store.current();
        store.record_poll_failure();

        let after = store.current();
        assert!(!after.backend_connected);
        assert_eq!(
            after,
            ServiceState {
                backend_connected: false,
                ..before
            }
        );
    }

    #[test]
    fn test_command_failure_then_dismiss() {
        let store = StateStore::new();
        store.record_command_failure("Backend unreachable: no socket".to_string());
        assert_eq!(
            store.current().error_message.as_deref(),
            Some("Backend unreachable: no socket")
        );
        assert!(store.current().backend_connected);

        store.dismiss_error();
        assert!(store.current().error_message.is_none());
    }

    #[tokio::test]
    async fn test_watch_observes_merges() {
        let store = StateStore::new();
        let mut rx = store.watch();

        store.apply_snapshot(&running_snapshot());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().status, ServiceStatus::Running);
    }

    #[tokio::test]
    async fn test_stream_yields_current_then_updates() {
        let store = StateStore::new();
        let mut stream = store.stream();

        let first = stream.next().await.unwrap();
        assert_eq!(first.status, ServiceStatus::Stopped);

        store.apply_snapshot(&running_snapshot());
        let second = stream.next().await.unwrap();
        assert_eq!(second.status, ServiceStatus::Running);
    }
}
