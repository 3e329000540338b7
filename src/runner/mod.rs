//! External build command execution
//!
//! The rebuild loop only talks to [`BuildRunner`]; the process-backed
//! implementation lives in [`command`]. Tests swap in their own runner.

mod command;

use std::sync::atomic::AtomicBool;
use std::time::Duration;

pub use command::{BuildCommand, CommandRunner};

/// Result of a single build attempt.
///
/// Transient: reported once and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Command exited with status zero
    Succeeded { duration: Duration },
    /// Non-zero exit, termination by signal, or spawn failure
    Failed {
        detail: String,
        exit_code: Option<i32>,
        duration: Duration,
    },
    /// Build was killed because the loop is shutting down
    Cancelled,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Succeeded { .. })
    }
}

/// Runs one build attempt to completion.
///
/// `running` is the loop's liveness flag; implementations that can block for
/// a long time should poll it and return [`BuildOutcome::Cancelled`] once it
/// is cleared.
pub trait BuildRunner: Send {
    fn run(&self, running: &AtomicBool) -> BuildOutcome;

    /// Short human-readable description, shown in start notices
    fn describe(&self) -> String;
}

/// Whole milliseconds, saturating at `u64::MAX`
pub(crate) fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl<R: BuildRunner + Sync> BuildRunner for std::sync::Arc<R> {
    fn run(&self, running: &AtomicBool) -> BuildOutcome {
        (**self).run(running)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
