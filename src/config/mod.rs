//! Configuration module for watch-rebuild
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (WATCH_REBUILD_*)
//! 3. Project config (watch-rebuild.toml) or `--config <file>`
//! 4. User config (~/.config/watch-rebuild/config.toml)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    load_layered, user_config_path, with_env_overrides, ConfigWarning, LoadedConfig,
    PROJECT_CONFIG_FILE,
};
pub use types::{
    BuildConfig, ColorMode, Config, ConfigOverrides, OutputConfig, OutputMode, WatchConfig,
    DEFAULT_BUILD_COMMAND, DEFAULT_WATCH_PATHS,
};
