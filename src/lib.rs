//! watch-rebuild - keep a build output in sync with its sources
//!
//! Watches a set of source directories and re-runs an external build
//! command whenever a file is added, changed or removed. One build runs on
//! startup; build failures are reported and never stop the watcher.

pub mod config;
pub mod error;
pub mod runner;
pub mod watcher;

// Re-exports for convenience
pub use config::{Config, ConfigOverrides, LoadedConfig, OutputMode};
pub use error::{WatchRebuildError, WatchRebuildResult};
pub use runner::{BuildCommand, BuildOutcome, BuildRunner, CommandRunner};
pub use watcher::{
    BuildTrigger, ChangeKind, LoopState, RebuildHandle, RebuildLoop, WatchEvent, WatchOptions,
};
