//! `vsp shadow-image` and `vsp shadow-image-facts`.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::shadow_image;
use crate::commands::module::{ModuleCmd, run_module};
use crate::domain::shadow_image::{ShadowImageFactsSpec, ShadowImageSpec};
use crate::output::ModuleResult;

/// Create, split, resync or delete one ShadowImage pair.
///
/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn run(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "pair", |cm, state, spec: ShadowImageSpec| {
        let done = shadow_image::ensure_pair(cm, &spec, state, &app.reporter())?;
        ModuleResult::ok("pair", done.changed, Some(done.message), &done.resource)
    })
}

/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn facts(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "pairs", |cm, _, spec: ShadowImageFactsSpec| {
        let pairs = shadow_image::pair_facts(cm, &spec)?;
        ModuleResult::ok("pairs", false, None, &pairs)
    })
}
