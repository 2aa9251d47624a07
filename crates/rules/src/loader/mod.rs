//! Rule index: every rule definition in a directory, keyed by trigger name.
//!
//! The directory is scanned once, non-recursively. Each `*.yaml` / `*.yml`
//! file holds one definition whose trigger is the file name without its
//! extension. Files are processed in sorted name order, so when two files
//! map to the same trigger the one sorting last wins.

mod core;
mod error;


pub use self::core::RuleIndex;
pub use self::error::{LoadResult, LoadStatus, Result, RuleError};
