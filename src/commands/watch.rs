use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use watch_rebuild::config::{load_layered, Config};
use watch_rebuild::runner::{BuildCommand, CommandRunner};
use watch_rebuild::watcher::{RebuildLoop, WatchEvent, WatchOptions};

use crate::cli::Cli;
use crate::ui::context::UiContext;

pub fn cmd_watch(cli: &Cli) -> Result<()> {
    let project_root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };

    let loaded = load_layered(&project_root, cli.config.as_deref())?;
    let mut config: Config = loaded.config;
    config.apply_overrides(&cli.overrides());

    let ui = UiContext::new(cli.json, cli.color, &config.output);

    if !cli.json {
        if let Some(source) = &loaded.source {
            crate::ui::output::print_config_warnings(source, &loaded.warnings, ui.unicode);
        }
    }

    let options = WatchOptions::from_config(&config.watch, project_root.clone());
    let command = BuildCommand::from_config(&config.build, &project_root)?;
    let runner = CommandRunner::new(command);
    let rebuild = RebuildLoop::new(options, runner);

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .context("failed to install Ctrl+C handler")?;

    if !cli.json {
        let watching: Vec<String> = config
            .watch
            .paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let source = loaded.source.as_ref().map(|p| p.display().to_string());
        print!(
            "{}",
            crate::ui::views::watch::render_watch_header(
                &watching,
                &config.build.command,
                source.as_deref(),
                ui.color,
                ui.unicode,
            )
        );
    }

    rebuild.run(running, |event| emit(&ui, &project_root, event))?;

    Ok(())
}

fn emit(ui: &UiContext, project_root: &Path, event: WatchEvent) {
    let event = relativize(event, project_root);

    if ui.json {
        println!("{}", event.to_json());
        return;
    }

    let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
    let rendered =
        crate::ui::views::watch::render_watch_event(&timestamp, &event, ui.color, ui.unicode);

    if event.is_failure() {
        eprint!("{rendered}");
    } else {
        print!("{rendered}");
    }
}

/// Show paths relative to the project root where possible
fn relativize(event: WatchEvent, project_root: &Path) -> WatchEvent {
    let rel = |path: &str| -> String {
        let path = PathBuf::from(path);
        let root = project_root
            .canonicalize()
            .unwrap_or_else(|_| project_root.to_path_buf());
        path.strip_prefix(&root)
            .or_else(|_| path.strip_prefix(project_root))
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    };

    match event {
        WatchEvent::FileChanged { path, kind } => WatchEvent::FileChanged {
            path: rel(&path),
            kind,
        },
        WatchEvent::WatchStarted { watching, command } => WatchEvent::WatchStarted {
            watching: watching.iter().map(|p| rel(p)).collect(),
            command,
        },
        other => other,
    }
}
