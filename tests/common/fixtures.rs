//! Reusable test content.

/// Watch set used by the jay-app layout
pub const WATCH_DIRS: &[&str] = &["src/components", "src/pages"];

pub const BUTTON_COMPONENT: &str = r#"import { Component, Define, html } from "jay-cm";

@Define
class Button extends Component {
  text = "Run";
  view = html`<button>${this.text}</button>`;
}
"#;

pub const INDEX_PAGE: &str = r#"import { Component, Define, html } from "jay-cm";

@Define
class Index extends Component {
  text = "Asgard Heat Pump";
  view = html`<h1>${this.text}</h1>`;
}
"#;

/// Project config pointing at the jay-app layout with a no-op build
pub const NOOP_CONFIG: &str = r#"[watch]
paths = ["src/components", "src/pages"]
debounce_ms = 50
settle_ms = 100

[build]
command = "true"
"#;
