use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;
use crate::error::TransportError;

/// Default IPC socket file the dispatcher listens on.
pub const DEFAULT_LISTEN_SOCKET: &str = "vsm-ipc.socket";

/// Default IPC socket file emitted signals are sent to.
pub const DEFAULT_EMIT_SOCKET: &str = "vsm-emit.socket";

// ── Top-level config ────────────────────────────────────────────────

/// Which backend to open and how to configure it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Backend name: `line` (alias `stdio`) or `zeromq` (alias `zmq`).
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Socket backend settings. Ignored by the line backend.
    #[serde(default)]
    pub zeromq: ZeromqConfig,
}

fn default_backend() -> String {
    "line".into()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            zeromq: ZeromqConfig::default(),
        }
    }
}

// ── Section configs ─────────────────────────────────────────────────

/// `[zeromq]` section: REQ/REP endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeromqConfig {
    /// Endpoint the dispatcher binds its REP socket on.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Endpoint emitted signals are sent to over a REQ socket.
    #[serde(default = "default_emit")]
    pub emit: String,

    /// Upper bound on one send/acknowledge round trip. 0 waits forever.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

fn default_listen() -> String {
    Endpoint::runtime_ipc(DEFAULT_LISTEN_SOCKET).endpoint()
}

fn default_emit() -> String {
    Endpoint::runtime_ipc(DEFAULT_EMIT_SOCKET).endpoint()
}

fn default_send_timeout_ms() -> u64 {
    5000
}

impl Default for ZeromqConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            emit: default_emit(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

impl ZeromqConfig {
    pub fn listen_endpoint(&self) -> Result<Endpoint, TransportError> {
        self.listen.parse()
    }

    pub fn emit_endpoint(&self) -> Result<Endpoint, TransportError> {
        self.emit.parse()
    }

    /// `None` when the timeout is disabled.
    pub fn send_timeout(&self) -> Option<Duration> {
        (self.send_timeout_ms > 0).then(|| Duration::from_millis(self.send_timeout_ms))
    }
}
