//! State shared by every command handler, built once from the global flags.

use std::io::IsTerminal as _;

use anyhow::Result;

use crate::application::services::config_service;
use crate::cli::GlobalArgs;
use crate::domain::config::VspConfig;
use crate::infra::config::YamlConfigStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Environment variables that imply `--yes`.
const ASSUME_YES_ENV: [&str; 2] = ["CI", "VSP_YES"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

pub struct AppContext {
    pub output: OutputContext,
    pub mode: OutputMode,
    pub config_store: YamlConfigStore,
    /// Destructive states run without asking.
    pub assume_yes: bool,
}

impl AppContext {
    #[must_use]
    pub fn new(args: &GlobalArgs) -> Self {
        let assume_yes =
            args.yes || ASSUME_YES_ENV.iter().any(|var| std::env::var_os(var).is_some());
        Self {
            output: OutputContext::new(args.no_color, args.quiet),
            mode: if args.json {
                OutputMode::Json
            } else {
                OutputMode::Human
            },
            config_store: YamlConfigStore,
            assume_yes,
        }
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Renderer for the active output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress reporter for one module run; silent in JSON mode.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output, self.is_json())
    }

    /// The user configuration, or defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read.
    pub fn config(&self) -> Result<VspConfig> {
        config_service::load_config(&self.config_store)
    }

    /// Ask before a destructive change.
    ///
    /// Proceeds without asking under `--yes`, `CI`/`VSP_YES`, in JSON mode,
    /// or when stdin is not a terminal; the caller runs unattended then.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal prompt fails.
    pub fn confirm(&self, prompt: &str) -> Result<bool> {
        if self.assume_yes || self.is_json() || !std::io::stdin().is_terminal() {
            return Ok(true);
        }
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}
