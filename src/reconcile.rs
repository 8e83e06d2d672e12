//! Snapshot reconciliation
//!
//! Pure transitions from one [`ServiceState`] to the next. Every mutation of
//! the store goes through one of these: the full-replacement snapshot merge,
//! or one of the narrow failure transitions that touch a single field.

use crate::types::{millis_to_utc, KickInterval, LogEntry, ServiceState, Snapshot, MAX_LOG_ENTRIES};

impl ServiceState {
    /// Merge an authoritative backend snapshot over this view
    ///
    /// Full replacement, not incremental: run state, connectivity statuses
    /// and the error message copy verbatim from the snapshot, the raw
    /// interval is quantized onto a permitted bucket, the log list replaces
    /// the prior one wholesale (order preserved, capped at
    /// [`MAX_LOG_ENTRIES`]), and `backend_connected` comes back `true` —
    /// reaching this path means communication succeeded.
    pub fn merge_snapshot(&self, snapshot: &Snapshot) -> ServiceState {
        ServiceState {
            status: snapshot.current_state,
            wifi_status: snapshot.wifi_status,
            internet_status: snapshot.internet_status,
            last_kick: snapshot.last_kick_time_ms.map(millis_to_utc),
            kick_interval: KickInterval::quantize(snapshot.interval_seconds),
            logs: snapshot
                .logs
                .iter()
                .take(MAX_LOG_ENTRIES)
                .map(LogEntry::from_raw)
                .collect(),
            error_message: snapshot.error_message.clone(),
            backend_connected: true,
        }
    }

    /// A poll failed to reach the backend
    ///
    /// Flips only `backend_connected`; status, logs and any visible error
    /// stay exactly as they were.
    pub fn with_backend_unreachable(&self) -> ServiceState {
        ServiceState {
            backend_connected: false,
            ..self.clone()
        }
    }

    /// A command failed
    ///
    /// Records the cause in `error_message` and touches nothing else — in
    /// particular not `backend_connected`, which belongs to the poll path.
    pub fn with_error(&self, message: impl Into<String>) -> ServiceState {
        ServiceState {
            error_message: Some(message.into()),
            ..self.clone()
        }
    }

    /// Explicit dismissal of the visible error
    pub fn with_error_dismissed(&self) -> ServiceState {
        ServiceState {
            error_message: None,
            ..self.clone()
        }
    }
}
