//! Sync session — the command gateway and session lifecycle
//!
//! `SyncSession` ties one backend, one state store and one poller together.
//! User intent goes through its five command methods; the resulting snapshot
//! (or failure) is folded into the shared state, which presentation code
//! reads through `state`, `watch` or `stream`.

use crate::backend::BackendClient;
use crate::error::Result;
use crate::poller;
use crate::store::StateStore;
use crate::types::{KickInterval, ServiceState, Snapshot};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

/// Configuration for a sync session
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Cadence of the background snapshot poll
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1200),
        }
    }
}

/// One client session against a keep-alive backend
///
/// Commands report failure twice: in the returned `Result` and in the shared
/// state's `error_message`, which is where presentation layers are expected
/// to read it. A command failure never touches `backend_connected` — that
/// flag belongs to the poll path alone.
///
/// ## Merge ordering
///
/// Merges apply in completion order, not issue order: when a slow command
/// response lands after an intervening poll, the command's snapshot is the
/// last write and wins. No sequence numbers are exchanged with the backend,
/// so a stale response can overwrite a newer view until the next poll tick
/// corrects it.
pub struct SyncSession {
    backend: Arc<dyn BackendClient>,
    store: Arc<StateStore>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl SyncSession {
    /// Start a session: create the store and begin polling immediately
    ///
    /// The first poll fires without waiting for the interval, so the store
    /// reflects the backend as soon as it answers once.
    pub fn spawn(backend: impl BackendClient + 'static, config: SessionConfig) -> Self {
        let backend: Arc<dyn BackendClient> = Arc::new(backend);
        let store = Arc::new(StateStore::new());
        let poller = tokio::spawn(poller::run(
            backend.clone(),
            store.clone(),
            config.poll_interval,
        ));

        tracing::info!(
            backend = backend.name(),
            poll_interval_ms = config.poll_interval.as_millis() as u64,
            "Sync session started"
        );

        Self {
            backend,
            store,
            poller: Mutex::new(Some(poller)),
        }
    }

    /// Backend name ("sim" or "remote")
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Atomic read of the whole current state
    pub fn state(&self) -> ServiceState {
        self.store.current()
    }

    /// Subscribe to state changes
    pub fn watch(&self) -> watch::Receiver<ServiceState> {
        self.store.watch()
    }

    /// State changes as an async stream, starting from the current value
    pub fn stream(&self) -> WatchStream<ServiceState> {
        self.store.stream()
    }

    /// Request transition to running
    pub async fn start(&self) -> Result<()> {
        self.dispatch("start_service", self.backend.start_service())
            .await
    }

    /// Request transition to stopped
    pub async fn stop(&self) -> Result<()> {
        self.dispatch("stop_service", self.backend.stop_service())
            .await
    }

    /// Request an immediate kick
    pub async fn kick_now(&self) -> Result<()> {
        self.dispatch("kick_now", self.backend.kick_now()).await
    }

    /// Request a new kick period
    pub async fn set_interval(&self, interval: KickInterval) -> Result<()> {
        self.dispatch("set_interval", self.backend.set_interval(interval.as_secs()))
            .await
    }

    /// Request backend process termination
    ///
    /// Fire-and-forget: an error means only that the request could not be
    /// dispatched. Quitting does not tear this session down — once the
    /// daemon exits, subsequent polls simply report it unreachable.
    pub async fn quit(&self) -> Result<()> {
        match self.backend.quit().await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(error = %e, "Quit dispatch failed");
                self.store.record_command_failure(e.to_string());
                Err(e)
            }
        }
    }

    /// Poll once, on demand
    ///
    /// Same semantics as a poller tick: merge on success, flip
    /// `backend_connected` on failure.
    pub async fn refresh(&self) -> Result<()> {
        match self.backend.status().await {
            Ok(snapshot) => {
                self.store.apply_snapshot(&snapshot);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(backend = self.backend.name(), error = %e, "Status refresh failed");
                self.store.record_poll_failure();
                Err(e)
            }
        }
    }

    /// Clear the visible error message
    ///
    /// Merged snapshots stay authoritative: if the backend still reports the
    /// error, the next merge makes it visible again.
    pub fn dismiss_error(&self) {
        self.store.dismiss_error();
    }

    /// Cancel the background poller
    ///
    /// Idempotent; also runs on drop. An individual poll or command already
    /// in flight may still complete and write to the store — harmless, since
    /// the store goes away with the session.
    pub fn shutdown(&self) {
        let handle = self
            .poller
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::info!(backend = self.backend.name(), "Sync session shut down");
        }
    }

    async fn dispatch(
        &self,
        method: &'static str,
        call: impl Future<Output = Result<Snapshot>>,
    ) -> Result<()> {
        match call.await {
            Ok(snapshot) => {
                self.store.apply_snapshot(&snapshot);
                tracing::debug!(method, "Command result merged");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(method, error = %e, "Command failed");
                self.store.record_command_failure(e.to_string());
                Err(e)
            }
        }
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}
