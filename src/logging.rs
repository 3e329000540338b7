//! Diagnostic logging
//!
//! User-facing notices are rendered by `ui`; `tracing` output is for
//! debugging the watcher itself and goes to stderr.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging based on verbosity level.
///
/// `RUST_LOG` wins when set; otherwise silent unless `-v` is given.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "watch_rebuild=debug,warn",
            _ => "watch_rebuild=trace,info",
        })
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}
