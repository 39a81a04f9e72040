//! Human-readable terminal renderer.

use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;
use serde_json::Value;

use crate::domain::config::VspConfig;
use crate::output::{ModuleResult, OutputContext};

/// Renders module results as a status line plus a YAML view of the data.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Status line, then the data. A failure prints only the error on
    /// stderr. The data is printed even when `quiet`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be rendered as YAML.
    pub fn render_result(&self, result: &ModuleResult) -> Result<()> {
        if result.failed {
            let msg = result.msg.as_deref().unwrap_or("module failed");
            self.ctx.error(msg);
            if result.changed {
                self.ctx
                    .warn("some changes were applied before the failure");
            }
            return Ok(());
        }

        if !self.ctx.quiet {
            let (style, word) = self.ctx.styles.outcome(result.changed);
            let status = word.style(style);
            match &result.msg {
                Some(msg) => println!("{status}: {msg}"),
                None => println!("{status}"),
            }
        }

        if let Some(data) = &result.data {
            print!("{}", yaml_view(result.key, data)?);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be rendered as YAML.
    pub fn render_config(&self, config: &VspConfig, path: &Path) -> Result<()> {
        self.ctx.header("vsp configuration");
        self.ctx.kv("file:", &path.display().to_string());
        println!();
        print!(
            "{}",
            serde_yaml::to_string(config).context("cannot render config")?
        );
        Ok(())
    }

    pub fn render_config_value(&self, key: &str, value: &str) {
        self.ctx.success(&format!("Set {key} = {value}"));
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        println!("vsp {version}");
    }
}

/// `key:` followed by the data as YAML. An empty list renders inline.
fn yaml_view(key: &str, data: &Value) -> Result<String> {
    if data.is_null() || data.as_array().is_some_and(Vec::is_empty) {
        let empty = if data.is_null() { "null" } else { "[]" };
        return Ok(format!("{key}: {empty}\n"));
    }
    let mut doc = serde_json::Map::new();
    doc.insert(key.to_string(), data.clone());
    serde_yaml::to_string(&doc).context("cannot render result")
}
