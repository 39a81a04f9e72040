//! Stderr spinner shown while a module talks to the array.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "];
const TEMPLATE: &str = "{spinner:.cyan} {msg} {elapsed:.dim}";
const TICK: Duration = Duration::from_millis(80);

/// A spinner that clears itself when dropped.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Start ticking on stderr with `step` as the message.
    #[must_use]
    pub fn start(step: &str) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        // An invalid template only falls back to the plain default style.
        if let Ok(style) = ProgressStyle::default_spinner().template(TEMPLATE) {
            bar.set_style(style.tick_strings(TICKS));
        }
        bar.set_message(step.to_string());
        bar.enable_steady_tick(TICK);
        Self { bar }
    }

    /// Replace the message after the spinner.
    pub fn set_step(&self, step: &str) {
        self.bar.set_message(step.to_string());
    }

    /// Print a line without tearing the spinner.
    pub fn println(&self, line: &str) {
        self.bar.suspend(|| eprintln!("{line}"));
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
