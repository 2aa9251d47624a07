//! Pluggable signal transports.
//!
//! A transport turns an outside source into a stream of [`Inbound`] units and
//! delivers emitted signals back out. Two backends ship with the crate:
//! [`LineTransport`] (text on stdin/stdout) and [`ZmqTransport`]
//! (MessagePack pairs over ZeroMQ REQ/REP).
//!
//! [`Inbound`]: vsm_core::Inbound

pub mod config;
pub mod endpoint;
pub mod error;
pub mod frame;
pub mod line;
pub mod registry;
pub mod reqrep;
pub mod traits;

pub use config::{TransportConfig, ZeromqConfig};
pub use endpoint::Endpoint;
pub use error::TransportError;
pub use frame::{SignalFrame, ACK};
pub use line::{format_line, LineTransport};
pub use registry::{open, Backend};
pub use reqrep::{SignalReceiver, SignalSender, ZmqTransport};
pub use traits::SignalTransport;
