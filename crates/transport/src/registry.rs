//! Backend selection by name.
//!
//! The dispatcher is handed a `Box<dyn SignalTransport>` built here, so it
//! never depends on which backend is behind it.

use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::line::LineTransport;
use crate::reqrep::ZmqTransport;
use crate::traits::SignalTransport;

/// Known transport backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Text lines on stdin/stdout.
    Line,
    /// MessagePack pairs over ZeroMQ REQ/REP.
    Zeromq,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Zeromq => "zeromq",
        }
    }
}

impl FromStr for Backend {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" | "stdio" => Ok(Self::Line),
            "zeromq" | "zmq" => Ok(Self::Zeromq),
            _ => Err(TransportError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Open `backend` with the settings in `config`.
pub async fn open(
    backend: Backend,
    config: &TransportConfig,
) -> Result<Box<dyn SignalTransport>, TransportError> {
    info!(backend = %backend, "opening transport");
    match backend {
        Backend::Line => Ok(Box::new(LineTransport::stdio())),
        Backend::Zeromq => Ok(Box::new(ZmqTransport::open(&config.zeromq).await?)),
    }
}
