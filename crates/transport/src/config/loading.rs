use std::path::Path;

use tracing::info;

use crate::error::TransportError;
use crate::registry::Backend;

use super::types::TransportConfig;

impl TransportConfig {
    /// Parse config from a TOML string, then apply environment overrides.
    pub fn from_toml(toml_str: &str) -> Result<Self, TransportError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        info!(path = %path.display(), "loaded transport config");
        Self::from_toml(&content)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn from_env() -> Result<Self, TransportError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configured backend name.
    pub fn backend(&self) -> Result<Backend, TransportError> {
        self.backend.parse()
    }

    // ── Environment variable overrides ──────────────────────────────

    /// Apply environment variable overrides.
    ///
    /// - `VSM_TRANSPORT_BACKEND` → `backend`
    /// - `VSM_ZEROMQ_LISTEN` → `zeromq.listen`
    /// - `VSM_ZEROMQ_EMIT` → `zeromq.emit`
    /// - `VSM_ZEROMQ_SEND_TIMEOUT_MS` → `zeromq.send_timeout_ms`
    pub(crate) fn apply_env_overrides(&mut self) -> Result<(), TransportError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), TransportError> {
        if let Some(v) = lookup("VSM_TRANSPORT_BACKEND") {
            self.backend = v;
        }
        if let Some(v) = lookup("VSM_ZEROMQ_LISTEN") {
            self.zeromq.listen = v;
        }
        if let Some(v) = lookup("VSM_ZEROMQ_EMIT") {
            self.zeromq.emit = v;
        }
        if let Some(v) = lookup("VSM_ZEROMQ_SEND_TIMEOUT_MS") {
            self.zeromq.send_timeout_ms = v.trim().parse().map_err(|_| {
                TransportError::Config(format!(
                    "VSM_ZEROMQ_SEND_TIMEOUT_MS must be a non-negative integer, got {v:?}"
                ))
            })?;
        }
        Ok(())
    }

    // ── Validation ──────────────────────────────────────────────────

    /// Check the backend name and, for the socket backend, both endpoints.
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.backend()? == Backend::Zeromq {
            let listen = self.zeromq.listen_endpoint()?;
            let emit = self.zeromq.emit_endpoint()?;
            if listen == emit {
                return Err(TransportError::Config(format!(
                    "zeromq.listen and zeromq.emit must differ, both are {listen}"
                )));
            }
        }
        Ok(())
    }
}
