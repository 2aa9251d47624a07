use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::TransportError;

/// Address of a ZeroMQ socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Unix domain socket at the given path. Fastest option for same-host peers.
    Ipc(PathBuf),

    /// TCP for peers on other hosts (and loopback tests).
    Tcp { host: String, port: u16 },
}

impl Endpoint {
    pub fn ipc(path: impl Into<PathBuf>) -> Self {
        Self::Ipc(path.into())
    }

    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// IPC endpoint for `file_name` under `$XDG_RUNTIME_DIR`, or `/tmp`
    /// when that is unset.
    pub fn runtime_ipc(file_name: &str) -> Self {
        let dir = std::env::var_os("XDG_RUNTIME_DIR")
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/tmp"));
        Self::Ipc(dir.join(file_name))
    }

    /// ZeroMQ endpoint address string.
    pub fn endpoint(&self) -> String {
        match self {
            Self::Ipc(path) => format!("ipc://{}", path.display()),
            Self::Tcp { host, port } => format!("tcp://{host}:{port}"),
        }
    }

    pub fn ipc_path(&self) -> Option<&Path> {
        match self {
            Self::Ipc(path) => Some(path),
            Self::Tcp { .. } => None,
        }
    }

    /// For IPC endpoints, ensure the parent directory exists.
    ///
    /// ZeroMQ requires the directory to exist before binding an IPC socket.
    /// This is a no-op for TCP endpoints.
    pub fn ensure_ipc_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.ipc_path().and_then(Path::parent) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Remove an IPC socket file left behind by a previous run, or by this
    /// one on shutdown.
    ///
    /// No-op for TCP endpoints or if the file doesn't exist.
    pub fn remove_stale_socket(&self) -> std::io::Result<()> {
        if let Some(path) = self.ipc_path() {
            match std::fs::remove_file(path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "removed IPC socket file");
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Parse `ipc://<path>` or `tcp://<host>:<port>`.
impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(path) = s.strip_prefix("ipc://") {
            if path.is_empty() {
                return Err(TransportError::Config(format!("empty IPC path in {s:?}")));
            }
            return Ok(Self::Ipc(PathBuf::from(path)));
        }

        if let Some(addr) = s.strip_prefix("tcp://") {
            let (host, port) = addr
                .rsplit_once(':')
                .ok_or_else(|| TransportError::Config(format!("missing port in {s:?}")))?;
            let port = port
                .parse::<u16>()
                .map_err(|_| TransportError::Config(format!("invalid port in {s:?}")))?;
            if host.is_empty() {
                return Err(TransportError::Config(format!("missing host in {s:?}")));
            }
            return Ok(Self::tcp(host, port));
        }

        Err(TransportError::Config(format!(
            "unsupported endpoint {s:?}, expected ipc://<path> or tcp://<host>:<port>"
        )))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}
