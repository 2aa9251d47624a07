//! Core types for the vehicle signal manager: values, events, live state
//! and the initial configuration file.

pub mod config;
pub mod error;
pub mod signal;
pub mod state;
pub mod value;

pub use config::InitialState;
pub use error::{CoreError, Result};
pub use signal::{validate_name, Event, Inbound, QUIT_SENTINEL};
pub use state::{Snapshot, StateStore};
pub use value::Value;
