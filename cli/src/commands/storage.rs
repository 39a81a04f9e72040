//! `vsp storage-facts`.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::storage_system;
use crate::commands::module::{ModuleCmd, run_module};
use crate::domain::storage::StorageFactsSpec;
use crate::output::ModuleResult;

/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn facts(app: &AppContext, cmd: &ModuleCmd) -> Result<ExitCode> {
    run_module(app, cmd, "storage_systems", |cm, _, spec: StorageFactsSpec| {
        let systems = storage_system::storage_facts(cm, &spec)?;
        ModuleResult::ok("storage_systems", false, None, &systems)
    })
}
