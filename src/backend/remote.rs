//! Remote backend over the daemon's control socket
//!
//! Talks newline-delimited JSON-RPC 2.0 to the keep-alive daemon on a Unix
//! domain socket. Connections are per-call: connect, write one request line,
//! read one response line, drop — this layer owns no long-lived socket, so a
//! daemon restart between calls needs no reconnect handling here.

use crate::backend::BackendClient;
use crate::error::{Result, SyncError};
use crate::types::Snapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::time::timeout;
use uuid::Uuid;

/// Default control socket of the keep-alive daemon
pub const DEFAULT_SOCKET_PATH: &str = "/run/kickd/kickd.sock";

/// Environment variable overriding the control socket path
pub const SOCKET_ENV_VAR: &str = "KICKD_SOCKET";

const JSONRPC_VERSION: &str = "2.0";

/// Configuration for the remote backend
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    /// Path to the daemon's control socket
    pub socket_path: PathBuf,

    /// How long to wait for the socket to accept a connection
    pub connect_timeout: Duration,

    /// How long to wait for the full request/response exchange
    pub request_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl RemoteConfig {
    /// Default configuration, honoring the [`SOCKET_ENV_VAR`] override
    pub fn discover() -> Self {
        match std::env::var(SOCKET_ENV_VAR) {
            Ok(path) if !path.is_empty() => Self {
                socket_path: PathBuf::from(path),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// Default timeouts against a specific socket path
    pub fn with_socket_path(path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: path.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'a str,
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<Value>,
    id: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
    #[serde(default)]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    message: String,
}

/// JSON-RPC client for the keep-alive daemon
#[derive(Debug)]
pub struct RemoteBackend {
    config: RemoteConfig,
}

impl RemoteBackend {
    /// Create a client for the daemon behind the configured socket
    pub fn new(config: RemoteConfig) -> Self {
        Self { config }
    }

    /// The socket path this client targets
    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    async fn connect(&self) -> Result<UnixStream> {
        let path = &self.config.socket_path;
        timeout(self.config.connect_timeout, UnixStream::connect(path))
            .await
            .map_err(|_| SyncError::Timeout(format!("connect to {}", path.display())))?
            .map_err(|e| SyncError::Transport(format!("{}: {}", path.display(), e)))
    }

    /// One full request/response exchange, returning the `result` payload
    async fn exchange(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let stream = self.connect().await?;
        let request_id = Uuid::new_v4().to_string();
        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id: request_id.clone(),
        };
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut response_line = String::new();

        timeout(self.config.request_timeout, async {
            write_half.write_all(line.as_bytes()).await?;
            reader.read_line(&mut response_line).await?;
            Ok::<_, std::io::Error>(())
        })
        .await
        .map_err(|_| SyncError::Timeout(format!("'{}' request", method)))?
        .map_err(|e| SyncError::Transport(format!("'{}' exchange failed: {}", method, e)))?;

        if response_line.is_empty() {
            return Err(SyncError::Transport(format!(
                "'{}' connection closed before a response arrived",
                method
            )));
        }

        let response: RpcResponse = serde_json::from_str(response_line.trim())?;

        match &response.id {
            Some(id) if *id == request_id => {}
            other => {
                return Err(SyncError::Transport(format!(
                    "'{}' response id mismatch (got {:?})",
                    method, other
                )));
            }
        }

        if let Some(error) = response.error {
            tracing::debug!(method, code = error.code, "Backend rejected call");
            return Err(SyncError::Rejected {
                method: method.to_string(),
                reason: error.message,
            });
        }

        response.result.ok_or_else(|| {
            SyncError::Transport(format!("'{}' response carried no result", method))
        })
    }

    async fn call(&self, method: &str, params: Option<Value>) -> Result<Snapshot> {
        let result = self.exchange(method, params).await?;
        let snapshot: Snapshot = serde_json::from_value(result)?;
        Ok(snapshot)
    }
}

#[async_trait]
impl BackendClient for RemoteBackend {
    async fn status(&self) -> Result<Snapshot> {
        self.call("get_status", None).await
    }

    async fn start_service(&self) -> Result<Snapshot> {
        self.call("start_service", None).await
    }

    async fn stop_service(&self) -> Result<Snapshot> {
        self.call("stop_service", None).await
    }

    async fn kick_now(&self) -> Result<Snapshot> {
        self.call("kick_now", None).await
    }

    async fn set_interval(&self, interval_seconds: u64) -> Result<Snapshot> {
        let params = serde_json::json!({ "intervalSeconds": interval_seconds });
        self.call("set_interval", Some(params)).await
    }

    async fn quit(&self) -> Result<()> {
        let mut stream = self.connect().await?;
        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method: "quit_app",
            params: None,
            id: Uuid::new_v4().to_string(),
        };
        let mut line = serde_json::to_string(&request)?;
        line.push('\n');

        // The daemon exits on receipt; don't wait for a reply that may never come.
        timeout(self.config.request_timeout, stream.write_all(line.as_bytes()))
            .await
            .map_err(|_| SyncError::Timeout("'quit_app' dispatch".to_string()))?
            .map_err(|e| SyncError::Transport(format!("'quit_app' dispatch failed: {}", e)))?;

        tracing::info!("Quit dispatched to daemon");
        Ok(())
    }

    fn name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RemoteConfig::default();
        assert_eq!(config.socket_path, PathBuf::from(DEFAULT_SOCKET_PATH));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_discover_honors_env_override() {
        std::env::set_var(SOCKET_ENV_VAR, "/tmp/kickd-custom.sock");
        let config = RemoteConfig::discover();
        std::env::remove_var(SOCKET_ENV_VAR);

        assert_eq!(config.socket_path, PathBuf::from("/tmp/kickd-custom.sock"));
        assert_eq!(RemoteConfig::discover().socket_path, PathBuf::from(DEFAULT_SOCKET_PATH));
    }

    #[test]
    fn test_request_serialization() {
        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method: "set_interval",
            params: Some(serde_json::json!({ "intervalSeconds": 120 })),
            id: "req-1".to_string(),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"method\":\"set_interval\""));
        assert!(json.contains("\"intervalSeconds\":120"));
        assert!(json.contains("\"id\":\"req-1\""));
    }

    #[test]
    fn test_request_skips_absent_params() {
        let request = RpcRequest {
            jsonrpc: JSONRPC_VERSION,
            method: "get_status",
            params: None,
            id: "req-2".to_string(),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("params"));
    }

    #[test]
    fn test_response_parsing() {
        let ok: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","result":{"x":1},"id":"a"}"#).unwrap();
        assert!(ok.result.is_some());
        assert!(ok.error.is_none());
        assert_eq!(ok.id.as_deref(), Some("a"));

        let err: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","error":{"code":-32000,"message":"Wi-Fi is off. Turn it on to start."},"id":"b"}"#,
        )
        .unwrap();
        assert!(err.result.is_none());
        let body = err.error.unwrap();
        assert_eq!(body.code, -32000);
        assert_eq!(body.message, "Wi-Fi is off. Turn it on to start.");
    }

    #[tokio::test]
    async fn test_missing_socket_is_a_transport_error() {
        let backend = RemoteBackend::new(RemoteConfig::with_socket_path(
            "/tmp/kicksync-no-such-daemon.sock",
        ));

        let err = backend.status().await.unwrap_err();
        assert!(matches!(err, SyncError::Transport(_)), "got {err:?}");
    }
}
