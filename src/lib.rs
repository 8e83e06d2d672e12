//! # kicksync
//!
//! Client-side state synchronization for a captive-portal keep-alive daemon.
//!
//! ## Overview
//!
//! A background daemon keeps a metered captive-portal session alive by
//! periodically re-authenticating ("kicking"). `kicksync` keeps a client's
//! view of that daemon in sync: it polls full snapshots on a fixed cadence,
//! dispatches user commands, and reconciles both into one `ServiceState`
//! that presentation code reads but never mutates. Swap the real daemon for
//! the built-in simulation without changing application code.
//!
//! ## Quick Start
//!
//! ```rust
//! use kicksync::{KickInterval, SessionConfig, SimBackend, SyncSession};
//!
//! # async fn example() -> kicksync::Result<()> {
//! // Run against the in-process simulation
//! let session = SyncSession::spawn(SimBackend::default(), SessionConfig::default());
//!
//! session.start().await?;
//! session.set_interval(KickInterval::Secs120).await?;
//!
//! let state = session.state();
//! println!("service: {:?}, {} log entries", state.status, state.logs.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Backends
//!
//! - **sim** — in-process simulation for testing and daemon-less use
//! - **remote** — newline-delimited JSON-RPC over the daemon's Unix control socket
//!
//! ## Architecture
//!
//! - **BackendClient** trait — core abstraction both backends implement
//! - **SyncSession** — command gateway owning the store and the poller task
//! - **StateStore** — the single `ServiceState` cell behind a watch channel
//! - **Snapshot** — full-replacement backend report merged on every poll and
//!   command; failures degrade to a visible error message, never a panic

pub mod backend;
pub mod error;
mod poller;
mod reconcile;
pub mod session;
pub mod store;
pub mod types;

// Re-export core types
pub use error::{Result, SyncError};
pub use session::{SessionConfig, SyncSession};
pub use store::StateStore;
pub use types::{
    InternetStatus, KickInterval, LogEntry, RawLogEntry, ServiceState, ServiceStatus, Snapshot,
    WifiStatus, MAX_LOG_ENTRIES,
};

// Re-export backends for convenience
pub use backend::remote::{RemoteBackend, RemoteConfig, DEFAULT_SOCKET_PATH, SOCKET_ENV_VAR};
pub use backend::sim::{SimBackend, SimConfig};
pub use backend::BackendClient;
