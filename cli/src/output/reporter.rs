//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.
//!
//! Progress goes to stderr so stdout carries only the module result.

use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;
use crate::output::progress::Spinner;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` updates the spinner, or prints `"  → {message}"` without one
/// - `success()` prints `"  ✓ {message}"`
/// - `warn()` prints `"  ! {message}"`
///
/// Nothing is printed when `silent` (quiet or JSON mode).
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    silent: bool,
    spinner: Option<Spinner>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext, silent: bool) -> Self {
        let spinner = (!silent && ctx.show_progress()).then(|| Spinner::start("connecting"));
        Self {
            ctx,
            silent: silent || ctx.quiet,
            spinner,
        }
    }

    fn print(&self, line: &str) {
        match &self.spinner {
            Some(spinner) => spinner.println(line),
            None => eprintln!("{line}"),
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if self.silent {
            return;
        }
        match &self.spinner {
            Some(spinner) => spinner.set_step(message),
            None => self.print(&format!("  {} {message}", "→".style(self.ctx.styles.step))),
        }
    }

    fn success(&self, message: &str) {
        if !self.silent {
            self.print(&format!("  {} {message}", "✓".style(self.ctx.styles.ok)));
        }
    }

    fn warn(&self, message: &str) {
        if !self.silent {
            self.print(&format!("  {} {message}", "!".style(self.ctx.styles.warning)));
        }
    }
}
