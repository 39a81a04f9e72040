//! `vsp host-group` and `vsp host-group-facts`.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::host_group;
use crate::commands::module::{ModuleCmd, run_module};
use crate::domain::host_group::{HostGroupFactsSpec, HostGroupSpec};
use crate::output::ModuleResult;

/// Create, update or delete one host group with its WWNs and LUN paths.
///
/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn run(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "host_group", |cm, state, spec: HostGroupSpec| {
        let done = host_group::ensure_host_group(cm, spec, state.ensure()?, &app.reporter())?;
        ModuleResult::ok("host_group", done.changed, Some(done.message), &done.resource)
    })
}

/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn facts(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "host_groups", |cm, _, spec: HostGroupFactsSpec| {
        let groups = host_group::host_group_facts(cm, &spec)?;
        ModuleResult::ok("host_groups", false, None, &groups)
    })
}
