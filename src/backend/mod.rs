//! Backend client trait — the core abstraction over the keep-alive daemon
//!
//! Both backends (remote daemon over a Unix socket, in-process simulation)
//! implement `BackendClient` to provide a uniform API for queries and
//! commands.

use crate::error::Result;
use crate::types::Snapshot;
use async_trait::async_trait;

pub mod remote;
pub mod sim;

/// Core trait for keep-alive backends
///
/// Implementations handle the transport-specific details of reaching the
/// daemon (or simulating one). The session and poller perform all operations
/// through this trait. Every call other than `quit` answers with a full
/// [`Snapshot`] — commands report their effect the same way queries do.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Query the current snapshot; read-only
    async fn status(&self) -> Result<Snapshot>;

    /// Request transition to running
    ///
    /// Preconditions (Wi-Fi up, internet reachable) are the backend's to
    /// enforce, not the caller's.
    async fn start_service(&self) -> Result<Snapshot>;

    /// Request transition to stopped; always permitted
    async fn stop_service(&self) -> Result<Snapshot>;

    /// Request an immediate kick; meaningful only while running
    async fn kick_now(&self) -> Result<Snapshot>;

    /// Request a new kick period, in raw seconds
    async fn set_interval(&self, interval_seconds: u64) -> Result<Snapshot>;

    /// Request process termination
    ///
    /// Best-effort fire: no snapshot comes back, and an error means only
    /// that the request could not be dispatched.
    async fn quit(&self) -> Result<()>;

    /// Backend name (e.g., "remote", "sim")
    fn name(&self) -> &str;
}
