//! `vsp volume` and `vsp volume-facts`.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::volume;
use crate::commands::module::{ModuleCmd, run_module};
use crate::domain::volume::{VolumeFactsSpec, VolumeSpec};
use crate::output::ModuleResult;

/// Create, resize, relabel or delete one LDEV.
///
/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn run(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "volume", |cm, state, spec: VolumeSpec| {
        let done = volume::ensure_volume(cm, &spec, state.ensure()?, &app.reporter())?;
        ModuleResult::ok("volume", done.changed, Some(done.message), &done.resource)
    })
}

/// List LDEVs.
///
/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn facts(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "volumes", |cm, _, spec: VolumeFactsSpec| {
        let volumes = volume::volume_facts(cm, &spec)?;
        ModuleResult::ok("volumes", false, None, &volumes)
    })
}
