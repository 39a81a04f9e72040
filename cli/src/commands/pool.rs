//! `vsp pool` and `vsp pool-facts`.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::pool;
use crate::commands::module::{ModuleCmd, run_module};
use crate::domain::pool::{PoolFactsSpec, PoolSpec};
use crate::output::ModuleResult;

/// Create, expand, update or delete one pool.
///
/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn run(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "pool", |cm, state, spec: PoolSpec| {
        let done = pool::ensure_pool(cm, &spec, state.ensure()?, &app.reporter())?;
        ModuleResult::ok("pool", done.changed, Some(done.message), &done.resource)
    })
}

/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn facts(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "pools", |cm, _, spec: PoolFactsSpec| {
        let pools = pool::pool_facts(cm, &spec)?;
        ModuleResult::ok("pools", false, None, &pools)
    })
}
