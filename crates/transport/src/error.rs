use thiserror::Error;

/// Errors that can occur in the transport layer.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),

    #[error("deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),

    #[error("zeromq error: {0}")]
    Zmq(#[from] zeromq::ZmqError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("no acknowledgement after {0:?}")]
    Timeout(std::time::Duration),

    #[error("transport is closed")]
    Closed,

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("unknown transport backend {0:?} (known: line, zeromq)")]
    UnknownBackend(String),
}

impl TransportError {
    /// The peer delivered one unusable message; the transport itself is
    /// still healthy and the next receive can proceed.
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::Deserialization(_) | Self::Protocol(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_and_protocol_errors_are_malformed_input() {
        let decode = crate::frame::SignalFrame::from_bytes(&[0xff, 0x00]).unwrap_err();
        assert!(TransportError::from(decode).is_malformed_input());
        assert!(TransportError::Protocol("two frames".into()).is_malformed_input());

        assert!(!TransportError::Closed.is_malformed_input());
        assert!(!TransportError::Timeout(std::time::Duration::from_secs(1)).is_malformed_input());
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        assert!(!TransportError::from(io).is_malformed_input());
    }
}
