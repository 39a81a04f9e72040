//! JSON renderer.
//!
//! Every document goes to stdout pretty-printed, one per run.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::config::VspConfig;
use crate::output::ModuleResult;

/// Renders results as JSON documents on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_result(&self, result: &ModuleResult) -> Result<()> {
        println!(
            "{}",
            serde_json::to_string_pretty(&result.to_value()).context("JSON serialization failed")?
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config(&self, config: &VspConfig, path: &Path) -> Result<()> {
        let doc = serde_json::json!({
            "path": path.display().to_string(),
            "config": config,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&doc).context("JSON serialization failed")?
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_config_value(&self, key: &str, value: &str) -> Result<()> {
        let doc = serde_json::json!({ "key": key, "value": value });
        println!("{}", serde_json::to_string(&doc).context("JSON serialization failed")?);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        let doc = serde_json::json!({ "version": version });
        println!("{}", serde_json::to_string(&doc).context("JSON serialization failed")?);
        Ok(())
    }
}
