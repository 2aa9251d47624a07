//! Error types and load result structures for the rule index.

use std::path::PathBuf;

use crate::compiler::CompileError;

/// Errors that can occur while building the rule index.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured rules path is missing or not a directory.
    #[error("rules directory {0} does not exist or is not a directory")]
    Directory(PathBuf),

    /// YAML parse/deserialization error.
    #[error("YAML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Definition parsed but could not be compiled.
    #[error("rule '{trigger}' ({path}): {source}")]
    Compile {
        trigger: String,
        path: PathBuf,
        #[source]
        source: CompileError,
    },
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;

/// Outcome of processing a single directory entry.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the entry.
    pub path: PathBuf,
    /// What happened to it.
    pub status: LoadStatus,
}

/// Status of a single directory entry.
#[derive(Debug, PartialEq)]
pub enum LoadStatus {
    /// Rule was compiled and indexed.
    Loaded { trigger: String },
    /// Rule was compiled and replaced an earlier file with the same trigger.
    Replaced { trigger: String, previous: PathBuf },
    /// Entry was skipped (dotfile, subdirectory, non-YAML).
    Skipped { reason: String },
}
