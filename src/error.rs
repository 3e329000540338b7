//! Error types for watch-rebuild
//!
//! Library code returns `WatchRebuildResult`; the binary wraps it in `anyhow`.
//! Build command failures are not errors here: they are reported as
//! [`BuildOutcome::Failed`](crate::runner::BuildOutcome) and the loop keeps going.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for watch-rebuild operations
pub type WatchRebuildResult<T> = Result<T, WatchRebuildError>;

/// Main error type for watch-rebuild operations
#[derive(Error, Debug)]
pub enum WatchRebuildError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// A configured watch path does not exist
    #[error("watch path not found: {path}")]
    WatchPathNotFound { path: PathBuf },

    /// The watch set is empty
    #[error("no watch paths configured")]
    NoWatchPaths,

    /// The filesystem watcher could not be created or subscribed
    #[error("failed to watch {path}: {message}")]
    Watcher { path: PathBuf, message: String },

    /// Build command is empty or malformed
    #[error("invalid build command '{command}': {reason}")]
    InvalidCommand { command: String, reason: String },

    /// Ignore pattern could not be compiled
    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidIgnorePattern { pattern: String, message: String },

    /// The loop thread panicked or could not be joined
    #[error("rebuild loop terminated abnormally")]
    LoopPanicked,
}

impl WatchRebuildError {
    pub(crate) fn watcher(path: impl Into<PathBuf>, err: notify::Error) -> Self {
        Self::Watcher {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
