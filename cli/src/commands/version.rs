//! Version command

use anyhow::Result;

use crate::app::AppContext;

/// Run the version command.
///
/// # Errors
///
/// Returns an error if the version cannot be rendered.
pub fn run(app: &AppContext) -> Result<()> {
    app.renderer().render_version(env!("CARGO_PKG_VERSION"))
}
