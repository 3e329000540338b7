//! File watcher that re-runs a build command on change
//!
//! Implements the rebuild loop with:
//! - One build on startup, before monitoring begins
//! - add/change/unlink detection via `notify`, pre-existing files ignored
//! - Debouncing (100ms default) and at most one build in flight
//! - Graceful stop through a handle or a shared running flag
//! - NDJSON output for CI

mod event;
mod filter;
mod rebuild;

pub use event::{
    classify, BuildTrigger, ChangeKind, LoopState, WatchEvent, WatchOptions, WatcherState,
    DEBOUNCE_MS, MAX_WAIT_MS,
};
pub use filter::PathFilter;
pub use rebuild::{RebuildHandle, RebuildLoop, StateCell};
