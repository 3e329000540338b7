use std::path::Path;

use watch_rebuild::config::ConfigWarning;

use crate::ui::primitives::icon::Icon;

pub fn print_config_warnings(path: &Path, warnings: &[ConfigWarning], unicode: bool) {
    let icon = Icon::Warning.render(unicode);
    for w in warnings {
        if let Some(line) = w.line {
            eprintln!("{} Unknown config key '{}' in {}:{}", icon, w.key, path.display(), line);
        } else {
            eprintln!("{} Unknown config key '{}' in {}", icon, w.key, path.display());
        }

        if let Some(suggestion) = &w.suggestion {
            eprintln!("   Did you mean '{}'?\n", suggestion);
        }
    }
}
