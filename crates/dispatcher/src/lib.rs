//! The dispatch loop: receive events, update state, fire rules, emit.

pub mod dispatcher;
pub mod error;
pub mod stats;

pub use dispatcher::{Dispatcher, Flow};
pub use error::DispatchError;
pub use stats::DispatchStats;
