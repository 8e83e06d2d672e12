//! In-process simulation backend
//!
//! Stands in for the keep-alive daemon when none is present: same command
//! surface, same snapshot shape, with connectivity and timing under the
//! host's control. Demos run against it; so do most tests.

use crate::backend::BackendClient;
use crate::error::Result;
use crate::types::{
    InternetStatus, KickInterval, RawLogEntry, ServiceStatus, Snapshot, WifiStatus,
    MAX_LOG_ENTRIES,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Configuration for the simulation backend
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// Delay between accepting a start and reporting RUNNING
    pub start_delay: Duration,

    /// Simulated Wi-Fi link state
    pub wifi_connected: bool,

    /// Simulated internet reachability
    pub internet_online: bool,

    /// Initial kick period
    pub interval: KickInterval,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(1500),
            wifi_connected: true,
            internet_online: true,
            interval: KickInterval::Secs20,
        }
    }
}

/// Simulated run state
///
/// Deliberately smaller than [`ServiceStatus`]: the simulation never reports
/// STOPPING or ERROR.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum RunState {
    Stopped,
    Starting,
    Running,
}

struct Inner {
    run_state: RunState,
    wifi_connected: bool,
    internet_online: bool,
    /// Link state as last observed by an operation; UNKNOWN until probed
    wifi_status: WifiStatus,
    internet_status: InternetStatus,
    last_kick_ms: Option<u64>,
    interval: KickInterval,
    logs: VecDeque<RawLogEntry>,
    next_log_id: u64,
    error_message: Option<String>,
    quit_requested: bool,
}

impl Inner {
    fn new(config: &SimConfig) -> Self {
        let mut inner = Self {
            run_state: RunState::Stopped,
            wifi_connected: config.wifi_connected,
            internet_online: config.internet_online,
            wifi_status: WifiStatus::Unknown,
            internet_status: InternetStatus::Unknown,
            last_kick_ms: None,
            interval: config.interval,
            logs: VecDeque::new(),
            next_log_id: 0,
            error_message: None,
            quit_requested: false,
        };
        inner.push_log("Service initialized in STOPPED state.");
        inner
    }

    fn push_log(&mut self, message: impl Into<String>) {
        let entry = RawLogEntry {
            id: self.next_log_id,
            message: message.into(),
            timestamp_ms: now_millis(),
        };
        self.next_log_id += 1;
        self.logs.push_front(entry);
        self.logs.truncate(MAX_LOG_ENTRIES);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_state: match self.run_state {
                RunState::Stopped => ServiceStatus::Stopped,
                RunState::Starting => ServiceStatus::Starting,
                RunState::Running => ServiceStatus::Running,
            },
            wifi_status: self.wifi_status,
            internet_status: self.internet_status,
            last_kick_time_ms: self.last_kick_ms,
            interval_seconds: self.interval.as_secs(),
            logs: self.logs.iter().cloned().collect(),
            error_message: self.error_message.clone(),
        }
    }
}

/// Simulated keep-alive daemon
///
/// Cheap to clone — clones share one simulated daemon, so a host can hand a
/// clone to the session and keep another for the simulation-only controls
/// ([`set_wifi_connected`](SimBackend::set_wifi_connected),
/// [`clear_logs`](SimBackend::clear_logs), ...).
#[derive(Clone)]
pub struct SimBackend {
    inner: Arc<Mutex<Inner>>,
    start_delay: Duration,
}

impl SimBackend {
    /// Create a simulated daemon
    pub fn new(config: SimConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::new(&config))),
            start_delay: config.start_delay,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Flip the simulated Wi-Fi link
    ///
    /// Takes effect the next time an operation probes connectivity.
    pub fn set_wifi_connected(&self, connected: bool) {
        self.lock().wifi_connected = connected;
    }

    /// Flip the simulated internet reachability
    pub fn set_internet_online(&self, online: bool) {
        self.lock().internet_online = online;
    }

    /// Drop all simulated log entries (simulation-only operation)
    pub fn clear_logs(&self) {
        self.lock().logs.clear();
    }

    /// Whether `quit()` has been requested on this simulation
    pub fn quit_requested(&self) -> bool {
        self.lock().quit_requested
    }
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

#[async_trait]
impl BackendClient for SimBackend {
    async fn status(&self) -> Result<Snapshot> {
        Ok(self.lock().snapshot())
    }

    async fn start_service(&self) -> Result<Snapshot> {
        let snapshot = {
            let mut inner = self.lock();
            if inner.run_state != RunState::Stopped {
                return Ok(inner.snapshot());
            }

            // Probe connectivity the way the daemon would before kicking:
            // Wi-Fi first, internet only once the link is up.
            inner.wifi_status = if inner.wifi_connected {
                WifiStatus::Connected
            } else {
                WifiStatus::Disconnected
            };
            if !inner.wifi_connected {
                inner.error_message = Some("Wi-Fi is off. Turn it on to start.".to_string());
                inner.push_log("Start blocked because Wi-Fi is disconnected.");
                return Ok(inner.snapshot());
            }

            inner.internet_status = if inner.internet_online {
                InternetStatus::Online
            } else {
                InternetStatus::Offline
            };
            if !inner.internet_online {
                inner.error_message = Some("Internet unavailable. Start blocked.".to_string());
                inner.push_log("Start blocked because internet is offline.");
                return Ok(inner.snapshot());
            }

            inner.run_state = RunState::Starting;
            inner.error_message = None;
            inner.push_log("Start requested.");
            inner.snapshot()
        };

        let inner = Arc::clone(&self.inner);
        let delay = self.start_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut inner = inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if inner.run_state == RunState::Starting {
                inner.run_state = RunState::Running;
                inner.last_kick_ms = Some(now_millis());
                inner.push_log("Service started");
                inner.push_log("Kick OK");
                tracing::debug!("Simulated service transitioned to RUNNING");
            }
        });

        tracing::debug!("Simulated start accepted");
        Ok(snapshot)
    }

    async fn stop_service(&self) -> Result<Snapshot> {
        let mut inner = self.lock();
        if inner.run_state != RunState::Running {
            return Ok(inner.snapshot());
        }
        inner.run_state = RunState::Stopped;
        inner.error_message = None;
        inner.push_log("Service stopped by user.");
        tracing::debug!("Simulated service stopped");
        Ok(inner.snapshot())
    }

    async fn kick_now(&self) -> Result<Snapshot> {
        let mut inner = self.lock();
        if inner.run_state != RunState::Running {
            return Ok(inner.snapshot());
        }
        inner.last_kick_ms = Some(now_millis());
        inner.push_log("Manual kick sent successfully.");
        Ok(inner.snapshot())
    }

    async fn set_interval(&self, interval_seconds: u64) -> Result<Snapshot> {
        let mut inner = self.lock();
        let adopted = KickInterval::quantize(interval_seconds);
        inner.interval = adopted;
        inner.push_log(format!("Kick interval set to {}s.", adopted.as_secs()));
        Ok(inner.snapshot())
    }

    async fn quit(&self) -> Result<()> {
        self.lock().quit_requested = true;
        tracing::info!("Simulated quit requested");
        Ok(())
    }

    fn name(&self) -> &str {
        "sim"
    }
}

/// Current time in Unix milliseconds
fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
