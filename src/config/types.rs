//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::WatchRebuildResult;

use super::loader::{self, ConfigWarning};

/// Directories watched when nothing else is configured.
pub const DEFAULT_WATCH_PATHS: &[&str] = &["src/components", "src/pages"];

/// Build command run when nothing else is configured.
pub const DEFAULT_BUILD_COMMAND: &str = "npx jay build";

/// Watch set configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_watch_paths")]
    pub paths: Vec<PathBuf>,

    /// Gitignore-style patterns for paths that never trigger a build
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Quiet period after the latest change before a build starts
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Events reported right after subscribing are drained for this long
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            paths: default_watch_paths(),
            ignore: default_ignore(),
            debounce_ms: default_debounce_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

fn default_watch_paths() -> Vec<PathBuf> {
    DEFAULT_WATCH_PATHS.iter().map(PathBuf::from).collect()
}

fn default_ignore() -> Vec<String> {
    vec![
        "*.swp".to_string(),
        "*~".to_string(),
        ".DS_Store".to_string(),
    ]
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_settle_ms() -> u64 {
    200
}

/// How the build command's stdout/stderr are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Child shares the terminal with watch-rebuild
    #[default]
    Inherit,
    /// Child output is collected; stderr is attached to failure notices
    Capture,
}

/// Build command configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_command")]
    pub command: String,

    /// Run through `sh -c` (`cmd /C` on Windows) instead of splitting on whitespace
    #[serde(default = "default_true")]
    pub shell: bool,

    #[serde(default)]
    pub output: OutputMode,

    /// Working directory for the command (relative to the project root)
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            shell: true,
            output: OutputMode::default(),
            cwd: None,
        }
    }
}

fn default_command() -> String {
    DEFAULT_BUILD_COMMAND.to_string()
}

/// Color mode for console notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Console output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: ColorMode,

    #[serde(default = "default_true")]
    pub unicode: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::default(),
            unicode: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> WatchRebuildResult<Self> {
        loader::load_with_warnings(path).map(|(config, _)| config)
    }

    /// Load configuration and collect unknown-key warnings
    pub fn load_with_warnings(path: &Path) -> WatchRebuildResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Apply CLI flag overrides (highest priority layer)
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if !overrides.paths.is_empty() {
            self.watch.paths = overrides.paths.clone();
        }
        if let Some(command) = &overrides.command {
            self.build.command = command.clone();
        }
        if let Some(ms) = overrides.debounce_ms {
            self.watch.debounce_ms = ms;
        }
        if let Some(color) = overrides.color {
            self.output.color = color;
        }
        if overrides.capture_output {
            self.build.output = OutputMode::Capture;
        }
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub paths: Vec<PathBuf>,
    pub command: Option<String>,
    pub debounce_ms: Option<u64>,
    pub color: Option<ColorMode>,
    pub capture_output: bool,
}
