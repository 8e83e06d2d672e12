//! Core state types for the kicksync system
//!
//! Wire types use camelCase JSON serialization for compatibility with the
//! keep-alive daemon's snapshot contract.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Maximum number of log entries retained in client state
pub const MAX_LOG_ENTRIES: usize = 50;

/// Authoritative run state of the keep-alive service
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    /// Service is not running
    #[default]
    Stopped,
    /// Start accepted, first kick pending
    Starting,
    /// Service is kicking on schedule
    Running,
    /// Stop accepted, shutdown pending
    Stopping,
    /// Service hit an unrecoverable fault
    Error,
}

/// Wi-Fi link state as observed by the backend
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WifiStatus {
    Connected,
    Disconnected,
    /// Not probed yet
    #[default]
    Unknown,
}

/// Internet reachability as observed by the backend
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InternetStatus {
    Online,
    Offline,
    /// Not probed yet
    #[default]
    Unknown,
}

/// Permitted kick periods
///
/// The backend-integrated contract never goes below 60 seconds
/// ([`KickInterval::REMOTE_CHOICES`]); the simulation additionally allows
/// 20 seconds for faster feedback. Serializes as the period in seconds.
#[derive(
    Clone, Copy, Debug, Default, Deserialize_repr, Eq, Ord, PartialEq, PartialOrd, Serialize_repr,
)]
#[repr(u16)]
pub enum KickInterval {
    #[default]
    Secs20 = 20,
    Secs60 = 60,
    Secs120 = 120,
    Secs300 = 300,
}

impl KickInterval {
    /// Periods the remote daemon accepts (hard floor: 60 seconds)
    pub const REMOTE_CHOICES: [KickInterval; 3] =
        [KickInterval::Secs60, KickInterval::Secs120, KickInterval::Secs300];

    /// Periods the simulation accepts
    pub const SIM_CHOICES: [KickInterval; 4] = [
        KickInterval::Secs20,
        KickInterval::Secs60,
        KickInterval::Secs120,
        KickInterval::Secs300,
    ];

    /// Map a raw backend-reported period onto a permitted bucket
    ///
    /// Fixed staircase, not a nearest-match search: values up to 20 land on
    /// the lowest bucket, up to 60 on the 60 bucket, 300 and above on the
    /// highest bucket, everything in between on 120. Out-of-set values are
    /// expected and never an error.
    pub fn quantize(seconds: u64) -> Self {
        if seconds <= 20 {
            KickInterval::Secs20
        } else if seconds <= 60 {
            KickInterval::Secs60
        } else if seconds >= 300 {
            KickInterval::Secs300
        } else {
            KickInterval::Secs120
        }
    }

    /// The period in seconds
    pub fn as_secs(self) -> u64 {
        self as u16 as u64
    }
}

/// A single backend-reported log event on the wire
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogEntry {
    /// Monotonically increasing id assigned by the backend
    pub id: u64,

    /// Human-readable message
    pub message: String,

    /// Unix timestamp in milliseconds
    pub timestamp_ms: u64,
}

/// Full backend state report
///
/// The sole data shape crossing the backend boundary: queries and commands
/// alike answer with a complete snapshot. There are no partial or delta
/// forms — every successful call yields a full replacement view.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Run state of the service
    pub current_state: ServiceStatus,

    /// Wi-Fi link state
    pub wifi_status: WifiStatus,

    /// Internet reachability
    pub internet_status: InternetStatus,

    /// Time of the most recent successful kick, epoch milliseconds
    #[serde(default)]
    pub last_kick_time_ms: Option<u64>,

    /// Configured kick period in raw seconds; quantized client-side
    pub interval_seconds: u64,

    /// Recent events, newest first
    #[serde(default)]
    pub logs: Vec<RawLogEntry>,

    /// Last operation failure reported by the backend
    #[serde(default)]
    pub error_message: Option<String>,
}

/// A log event in client state
///
/// Immutable once created; dropped when it falls past the retention window.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Stable unique id (stringified backend id)
    pub id: String,

    /// Human-readable message
    pub message: String,

    /// When the event occurred
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub(crate) fn from_raw(raw: &RawLogEntry) -> Self {
        Self {
            id: raw.id.to_string(),
            message: raw.message.clone(),
            timestamp: millis_to_utc(raw.timestamp_ms),
        }
    }
}

/// The client-side view of the keep-alive service
///
/// One instance per session, owned by the store and replaced wholesale on
/// every merge. Presentation code reads it; it never mutates it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceState {
    /// Authoritative run state
    pub status: ServiceStatus,

    /// Wi-Fi link state
    pub wifi_status: WifiStatus,

    /// Internet reachability
    pub internet_status: InternetStatus,

    /// Most recent successful kick, absent if none yet
    pub last_kick: Option<DateTime<Utc>>,

    /// Configured kick period, quantized to a permitted bucket
    pub kick_interval: KickInterval,

    /// Recent events, newest first, at most [`MAX_LOG_ENTRIES`]
    pub logs: Vec<LogEntry>,

    /// Last failed operation or connectivity fault, until cleared
    pub error_message: Option<String>,

    /// Whether the last poll reached the backend
    pub backend_connected: bool,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self {
            status: ServiceStatus::Stopped,
            wifi_status: WifiStatus::Unknown,
            internet_status: InternetStatus::Unknown,
            last_kick: None,
            kick_interval: KickInterval::Secs20,
            logs: Vec::new(),
            error_message: None,
            backend_connected: true,
        }
    }
}

/// Epoch milliseconds to a UTC timestamp; out-of-range falls back to the epoch
pub(crate) fn millis_to_utc(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or(DateTime::UNIX_EPOCH)
}
