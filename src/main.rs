//! watch-rebuild CLI
//!
//! Usage: watch-rebuild [OPTIONS]
//!
//! Runs the build command once, then again whenever a file under one of the
//! watched directories is added, changed or removed. Stop with Ctrl+C.

mod cli;
mod commands;
mod logging;
mod ui;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    commands::watch::cmd_watch(&cli)
}
