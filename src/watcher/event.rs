//! Watch event types, options and debounce state

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;
use serde::Serialize;

use crate::config::WatchConfig;

/// Debounce duration in milliseconds
pub const DEBOUNCE_MS: u64 = 100;

/// Longest a batch may wait under a continuous stream of changes
pub const MAX_WAIT_MS: u64 = 2_000;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Directories to watch, relative paths resolve against `project_root`
    pub paths: Vec<PathBuf>,
    /// Project root
    pub project_root: PathBuf,
    /// Gitignore-style patterns that never trigger a build
    pub ignore: Vec<String>,
    /// Quiet period after the latest change before a build starts
    pub debounce: Duration,
    /// Events reported right after subscribing are drained for this long
    pub settle: Duration,
}

impl WatchOptions {
    /// Create new watch options with minimal required fields
    pub fn new(paths: Vec<PathBuf>, project_root: PathBuf) -> Self {
        Self {
            paths,
            project_root,
            ignore: Vec::new(),
            debounce: Duration::from_millis(DEBOUNCE_MS),
            settle: Duration::ZERO,
        }
    }

    pub fn from_config(config: &WatchConfig, project_root: PathBuf) -> Self {
        Self::new(config.paths.clone(), project_root)
            .with_ignore(config.ignore.clone())
            .with_debounce(Duration::from_millis(config.debounce_ms))
            .with_settle(Duration::from_millis(config.settle_ms))
    }

    pub fn with_ignore(mut self, ignore: Vec<String>) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Watch paths resolved against the project root, duplicates removed
    pub fn resolved_paths(&self) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let resolved = if path.is_absolute() {
                path.clone()
            } else {
                self.project_root.join(path)
            };
            if !out.contains(&resolved) {
                out.push(resolved);
            }
        }
        out
    }
}

/// Qualifying filesystem change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Add,
    Change,
    Unlink,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Add => "add",
            ChangeKind::Change => "change",
            ChangeKind::Unlink => "unlink",
        }
    }
}

/// Map a notify event to the qualifying changes it represents.
///
/// Access and metadata-only events produce nothing. Backends that report
/// ambiguous kinds are resolved by checking whether the path still exists.
pub fn classify(kind: &EventKind, paths: &[PathBuf]) -> Vec<(PathBuf, ChangeKind)> {
    let existence = |p: &Path, present: ChangeKind| {
        if p.exists() {
            present
        } else {
            ChangeKind::Unlink
        }
    };

    match kind {
        EventKind::Create(_) => paths.iter().map(|p| (p.clone(), ChangeKind::Add)).collect(),
        EventKind::Remove(_) => paths
            .iter()
            .map(|p| (p.clone(), ChangeKind::Unlink))
            .collect(),
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(ModifyKind::Name(mode)) => match (mode, paths) {
            (RenameMode::From, _) => paths
                .iter()
                .map(|p| (p.clone(), ChangeKind::Unlink))
                .collect(),
            (RenameMode::To, _) => paths.iter().map(|p| (p.clone(), ChangeKind::Add)).collect(),
            (RenameMode::Both, [from, to, ..]) => vec![
                (from.clone(), ChangeKind::Unlink),
                (to.clone(), ChangeKind::Add),
            ],
            _ => paths
                .iter()
                .map(|p| (p.clone(), existence(p, ChangeKind::Add)))
                .collect(),
        },
        EventKind::Modify(_) => paths
            .iter()
            .map(|p| (p.clone(), existence(p, ChangeKind::Change)))
            .collect(),
        EventKind::Any | EventKind::Other => paths
            .iter()
            .map(|p| (p.clone(), existence(p, ChangeKind::Change)))
            .collect(),
        EventKind::Access(_) => Vec::new(),
    }
}

/// What caused a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTrigger {
    Startup,
    Change,
}

/// Loop phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    Idle,
    Building,
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    /// Loop started, before the startup build
    WatchStarted {
        watching: Vec<String>,
        command: String,
    },
    /// Monitoring is live
    Subscribed,
    /// File added, changed or removed
    FileChanged { path: String, kind: ChangeKind },
    /// Build command spawned
    BuildStarted { trigger: BuildTrigger },
    /// Build command exited with status zero
    BuildSucceeded { duration_ms: u64 },
    /// Build command failed or could not be spawned
    BuildFailed {
        message: String,
        exit_code: Option<i32>,
        duration_ms: u64,
    },
    /// Build killed during shutdown
    BuildCancelled,
    /// Watcher backend error (non-fatal)
    Error { message: String },
    /// Watch stopped
    Shutdown,
}

impl WatchEvent {
    /// Convert to JSON string with "command": "watch-rebuild" field included
    pub fn to_json(&self) -> String {
        let mut value =
            serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({"event": "error"}));
        if let Some(obj) = value.as_object_mut() {
            obj.insert("command".to_string(), serde_json::json!("watch-rebuild"));
        }
        serde_json::to_string(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Failure notices go to stderr
    pub fn is_failure(&self) -> bool {
        matches!(self, WatchEvent::BuildFailed { .. } | WatchEvent::Error { .. })
    }
}

/// Watcher state for debouncing
///
/// Changes are keyed by path; a later change to the same path replaces the
/// earlier kind. Changes that arrive while a build is running are held here
/// and become one follow-up build. A batch is released once the quiet
/// period has passed, or once its oldest change has waited `max_wait`.
#[derive(Debug)]
pub struct WatcherState {
    debounce: Duration,
    max_wait: Duration,
    pending_changes: BTreeMap<PathBuf, ChangeKind>,
    first_change: Option<Instant>,
    last_change: Option<Instant>,
}

impl Default for WatcherState {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEBOUNCE_MS))
    }
}

impl WatcherState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            max_wait: debounce.max(Duration::from_millis(MAX_WAIT_MS)),
            pending_changes: BTreeMap::new(),
            first_change: None,
            last_change: None,
        }
    }

    /// Override the cap; never shorter than the debounce window.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait.max(self.debounce);
        self
    }

    pub fn add_change(&mut self, path: PathBuf, kind: ChangeKind) {
        self.add_change_at(path, kind, Instant::now());
    }

    pub fn add_change_at(&mut self, path: PathBuf, kind: ChangeKind, now: Instant) {
        self.pending_changes.insert(path, kind);
        self.first_change.get_or_insert(now);
        self.last_change = Some(now);
    }

    /// Check if debounce period has passed and we have pending changes
    pub fn should_build(&self) -> bool {
        self.should_build_at(Instant::now())
    }

    pub fn should_build_at(&self, now: Instant) -> bool {
        if self.pending_changes.is_empty() {
            return false;
        }
        match (self.first_change, self.last_change) {
            (Some(first), Some(last)) => {
                now.saturating_duration_since(last) >= self.debounce
                    || now.saturating_duration_since(first) >= self.max_wait
            }
            _ => false,
        }
    }

    /// Take all pending changes (sorted by path), resetting state
    pub fn take_changes(&mut self) -> Vec<(PathBuf, ChangeKind)> {
        self.first_change = None;
        self.last_change = None;
        std::mem::take(&mut self.pending_changes).into_iter().collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_changes.is_empty()
    }
}
