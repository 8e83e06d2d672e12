//! Error types for kicksync

use thiserror::Error;

/// Errors that can occur while talking to the keep-alive backend
#[derive(Debug, Error)]
pub enum SyncError {
    /// Transport-level failure (socket missing, connection refused, daemon gone)
    #[error("Backend unreachable: {0}")]
    Transport(String),

    /// The backend accepted the call but refused the operation
    #[error("Backend rejected '{method}': {reason}")]
    Rejected {
        method: String,
        reason: String,
    },

    /// Serialization/deserialization failure on the wire
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
