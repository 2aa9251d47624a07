//! Transport configuration.
//!
//! Parsed from a TOML file with environment variable overrides, or built
//! from defaults plus environment alone when no file is given.
//!
//! ```toml
//! backend = "zeromq"
//!
//! [zeromq]
//! listen = "ipc:///run/user/1000/vsm-ipc.socket"
//! emit = "tcp://127.0.0.1:5560"
//! send_timeout_ms = 5000
//! ```

mod loading;
mod types;


pub use types::{TransportConfig, ZeromqConfig};
