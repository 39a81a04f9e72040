//! Output formatting module

pub mod human;
pub mod json;
pub mod progress;
pub mod reporter;
pub mod styles;

use std::path::Path;

use anyhow::Result;
use console::Term;
use owo_colors::OwoColorize as _;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::config::VspConfig;

pub use human::HumanRenderer;
pub use json::JsonRenderer;
pub use reporter::TerminalReporter;
pub use styles::Styles;

/// Output context carrying styling and terminal state.
pub struct OutputContext {
    /// Stylesheet for colored output.
    pub styles: Styles,
    /// Whether stdout is a TTY.
    pub is_tty: bool,
    /// Whether to suppress non-error output.
    pub quiet: bool,
}

impl OutputContext {
    /// Create output context based on CLI flags and environment.
    #[must_use]
    pub fn new(no_color: bool, quiet: bool) -> Self {
        let is_tty = Term::stdout().is_term();
        let use_colors = !no_color && is_tty && std::env::var("NO_COLOR").is_err();

        let styles = if use_colors {
            Styles::colored()
        } else {
            Styles::default()
        };

        Self {
            styles,
            is_tty,
            quiet,
        }
    }

    /// Check if progress indicators should be shown.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        Term::stderr().is_term() && !self.quiet
    }

    /// Print a success message prefixed with `✓`. Suppressed when `quiet`.
    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {msg}", "✓".style(self.styles.ok));
        }
    }

    /// Print a warning prefixed with `⚠` to stderr. Suppressed when `quiet`.
    pub fn warn(&self, msg: &str) {
        if !self.quiet {
            eprintln!("  {} {msg}", "⚠".style(self.styles.warning));
        }
    }

    /// Print an error message prefixed with `✗` to stderr. Never suppressed.
    pub fn error(&self, msg: &str) {
        eprintln!("  {} {msg}", "✗".style(self.styles.failed));
    }

    /// Print a section header. Suppressed when `quiet`.
    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("  {}", msg.style(self.styles.heading));
        }
    }

    /// Print a key-value pair with the key dimmed. Suppressed when `quiet`.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {}  {value}", key.style(self.styles.muted));
        }
    }
}

// ── Module results ───────────────────────────────────────────────────────────

/// What one module run reports, whatever the output mode.
///
/// Serialises to `{"changed", "failed", "msg", "<key>": data}`; `msg` and the
/// data key are omitted when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleResult {
    pub changed: bool,
    pub failed: bool,
    pub msg: Option<String>,
    /// Result key, e.g. `volume` or `volumes`.
    pub key: &'static str,
    pub data: Option<Value>,
}

impl ModuleResult {
    /// A successful run carrying `data` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be serialised.
    pub fn ok(
        key: &'static str,
        changed: bool,
        msg: Option<String>,
        data: &impl Serialize,
    ) -> Result<Self> {
        Ok(Self {
            changed,
            failed: false,
            msg,
            key,
            data: Some(serde_json::to_value(data)?),
        })
    }

    /// A failed run. `changed` reports whether anything was modified before
    /// the failure.
    #[must_use]
    pub fn failed(key: &'static str, changed: bool, msg: String) -> Self {
        Self {
            changed,
            failed: true,
            msg: Some(msg),
            key,
            data: None,
        }
    }

    /// The JSON document for this result.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("changed".to_string(), Value::Bool(self.changed));
        map.insert("failed".to_string(), Value::Bool(self.failed));
        if let Some(msg) = &self.msg {
            map.insert("msg".to_string(), Value::String(msg.clone()));
        }
        if let Some(data) = &self.data {
            map.insert(self.key.to_string(), data.clone());
        }
        Value::Object(map)
    }
}

// ── Renderer ─────────────────────────────────────────────────────────────────

/// Output-mode dispatch for everything a command prints on stdout.
pub enum Renderer<'a> {
    Human(HumanRenderer<'a>),
    Json(JsonRenderer),
}

impl Renderer<'_> {
    /// # Errors
    ///
    /// Returns an error if the result cannot be serialised.
    pub fn render_result(&self, result: &ModuleResult) -> Result<()> {
        match self {
            Self::Human(r) => r.render_result(result),
            Self::Json(r) => r.render_result(result),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialised.
    pub fn render_config(&self, config: &VspConfig, path: &Path) -> Result<()> {
        match self {
            Self::Human(r) => r.render_config(config, path),
            Self::Json(r) => r.render_config(config, path),
        }
    }

    /// Confirm one stored setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be serialised.
    pub fn render_config_value(&self, key: &str, value: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_config_value(key, value);
                Ok(())
            }
            Self::Json(r) => r.render_config_value(key, value),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the output cannot be serialised.
    pub fn render_version(&self, version: &str) -> Result<()> {
        match self {
            Self::Human(r) => {
                r.render_version(version);
                Ok(())
            }
            Self::Json(r) => r.render_version(version),
        }
    }
}
