//! Colors for module results and progress lines.

use owo_colors::Style;

/// Style per role in terminal output. `Default` is uncolored.
#[derive(Default, Clone)]
pub struct Styles {
    pub ok: Style,
    pub changed: Style,
    pub failed: Style,
    pub warning: Style,
    /// Progress steps and informational lines.
    pub step: Style,
    pub heading: Style,
    pub muted: Style,
}

impl Styles {
    /// The colored stylesheet used on a capable terminal.
    #[must_use]
    pub fn colored() -> Self {
        Self {
            ok: Style::new().green(),
            changed: Style::new().bold().yellow(),
            failed: Style::new().bold().red(),
            warning: Style::new().yellow(),
            step: Style::new().blue(),
            heading: Style::new().bold().cyan(),
            muted: Style::new().dimmed(),
        }
    }

    /// Style and word for a finished module run.
    #[must_use]
    pub fn outcome(&self, changed: bool) -> (Style, &'static str) {
        if changed {
            (self.changed, "changed")
        } else {
            (self.ok, "ok")
        }
    }
}
