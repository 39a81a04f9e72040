//! `vsp nvm-subsystem` and `vsp nvm-subsystem-facts`.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::nvm_subsystem;
use crate::commands::module::{ModuleCmd, run_module};
use crate::domain::nvm::{NvmSubsystemFactsSpec, NvmSubsystemSpec};
use crate::output::ModuleResult;

/// Create, extend or delete one NVM subsystem.
///
/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn run(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "nvm_subsystem", |cm, state, spec: NvmSubsystemSpec| {
        let done =
            nvm_subsystem::ensure_nvm_subsystem(cm, spec, state.ensure()?, &app.reporter())?;
        ModuleResult::ok(
            "nvm_subsystem",
            done.changed,
            Some(done.message),
            &done.resource,
        )
    })
}

/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn facts(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "nvm_subsystems", |cm, _, spec: NvmSubsystemFactsSpec| {
        let subsystems = nvm_subsystem::nvm_subsystem_facts(cm, &spec)?;
        ModuleResult::ok("nvm_subsystems", false, None, &subsystems)
    })
}
