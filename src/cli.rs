//! CLI argument parsing
//!
//! Every flag is optional: with none, the configured (or built-in) watch
//! set and build command are used.

use std::path::PathBuf;

use clap::Parser;
use watch_rebuild::config::{ColorMode, ConfigOverrides};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

impl From<ColorWhen> for ColorMode {
    fn from(value: ColorWhen) -> Self {
        match value {
            ColorWhen::Auto => ColorMode::Auto,
            ColorWhen::Always => ColorMode::Always,
            ColorWhen::Never => ColorMode::Never,
        }
    }
}

/// watch-rebuild - re-run a build command when sources change
#[derive(Parser, Debug)]
#[command(name = "watch-rebuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to watch (repeatable; replaces configured paths)
    #[arg(short, long = "watch", value_name = "DIR")]
    pub watch: Vec<PathBuf>,

    /// Build command to run on startup and after every change
    #[arg(short, long, value_name = "CMD")]
    pub command: Option<String>,

    /// Quiet period after the latest change before building
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Config file (default: ./watch-rebuild.toml, then user config)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root that relative paths resolve against
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output format for CI (NDJSON)
    #[arg(long)]
    pub json: bool,

    /// Color output mode
    #[arg(long, value_enum)]
    pub color: Option<ColorWhen>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            paths: self.watch.clone(),
            command: self.command.clone(),
            debounce_ms: self.debounce_ms,
            color: self.color.map(ColorMode::from),
            // keep stdout clean for NDJSON
            capture_output: self.json,
        }
    }
}
