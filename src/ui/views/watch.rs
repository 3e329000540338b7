use crate::ui::blocks::header::CommandHeader;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;
use watch_rebuild::watcher::{BuildTrigger, WatchEvent};

pub fn render_watch_header(
    watching: &[String],
    command: &str,
    config_source: Option<&str>,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut header = CommandHeader::new(Icon::Watch, "watch-rebuild");
    header.add("Watching", watching.join(", "));
    header.add("Command", command);
    header.add("Config", config_source.unwrap_or("built-in defaults"));
    header.add("Hint", "Press Ctrl+C to stop");
    header.render(supports_color, supports_unicode)
}

pub fn render_watch_event(
    timestamp: &str,
    event: &WatchEvent,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let prefix = ColoredText::dim(format!("[{}]", timestamp)).render(supports_color);
    let icon = |icon: Icon| icon.colored(supports_color, supports_unicode);

    match event {
        WatchEvent::WatchStarted { watching, .. } => format!(
            "{} {} Watching: {}\n",
            prefix,
            icon(Icon::Watch),
            watching.join(", ")
        ),
        WatchEvent::Subscribed => format!(
            "{} {} Waiting for changes...\n",
            prefix,
            icon(Icon::Watch)
        ),
        WatchEvent::FileChanged { path, kind } => format!(
            "{} {} {}: {}\n",
            prefix,
            icon(Icon::Arrow),
            kind.as_str(),
            path
        ),
        WatchEvent::BuildStarted { trigger } => {
            let label = match trigger {
                BuildTrigger::Startup => "Building...",
                BuildTrigger::Change => "Rebuilding...",
            };
            format!("{} {} {}\n", prefix, icon(Icon::Progress), label)
        }
        WatchEvent::BuildSucceeded { duration_ms } => format!(
            "{} {} {} ({}ms)\n",
            prefix,
            icon(Icon::Success),
            ColoredText::success("Rebuild complete.").render(supports_color),
            duration_ms
        ),
        WatchEvent::BuildFailed { message, .. } => format!(
            "{} {} {} {}\n",
            prefix,
            icon(Icon::Error),
            ColoredText::error("Rebuild failed:").render(supports_color),
            message
        ),
        WatchEvent::BuildCancelled => format!(
            "{} {} Build cancelled.\n",
            prefix,
            icon(Icon::Stop)
        ),
        WatchEvent::Error { message } => format!(
            "{} {} {} {}\n",
            prefix,
            icon(Icon::Warning),
            ColoredText::warning("Watcher error:").render(supports_color),
            message
        ),
        WatchEvent::Shutdown => format!(
            "\n{} {} Watch stopped.\n",
            prefix,
            icon(Icon::Watch)
        ),
    }
}
