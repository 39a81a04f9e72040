//! Shared plumbing for resource modules: read `--args`, connect, run,
//! report, disconnect.

use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde::de::DeserializeOwned;

use crate::app::AppContext;
use crate::application::services::connection_manager::ConnectionManager;
use crate::domain::args::{ModuleArgs, State};
use crate::domain::connection::ConnectionInfo;
use crate::infra::http::{ThreadSleeper, UreqTransport};
use crate::output::ModuleResult;

/// Connection manager over the real network.
pub type Manager = ConnectionManager<UreqTransport, ThreadSleeper>;

/// Arguments shared by every module subcommand.
#[derive(Args)]
pub struct ModuleCmd {
    /// Module arguments as YAML or JSON (`-` reads stdin)
    #[arg(long, value_name = "FILE")]
    pub args: PathBuf,
}

/// Parse a module-arguments document.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match the module's
/// schema.
pub fn read_args<S: DeserializeOwned + Default>(path: &Path) -> Result<ModuleArgs<S>> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read module arguments from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?
    };
    // YAML is a superset of the JSON documents we accept.
    serde_yaml::from_str(&text)
        .with_context(|| format!("invalid module arguments in {}", path.display()))
}

/// Build a connection manager with the user's poll and timeout settings.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or `info` is incomplete.
pub fn connect(app: &AppContext, info: ConnectionInfo) -> Result<Manager> {
    let config = app.config()?;
    let transport = UreqTransport::new(config.http_timeout());
    Ok(ConnectionManager::new(
        info,
        transport,
        ThreadSleeper,
        config.poll_policy(),
    )?)
}

/// Run one module end to end and render its result.
///
/// `op` receives the live manager, the requested state and the spec. Any
/// error becomes a failed result; the session is closed either way.
///
/// # Errors
///
/// Returns an error only if the result cannot be rendered.
pub fn run_module<S, F>(
    app: &AppContext,
    cmd: &ModuleCmd,
    key: &'static str,
    op: F,
) -> Result<ExitCode>
where
    S: DeserializeOwned + Default,
    F: FnOnce(&Manager, State, S) -> Result<ModuleResult>,
{
    let result = match prepare::<S>(app, cmd) {
        Err(e) => ModuleResult::failed(key, false, format!("{e:#}")),
        Ok(None) => ModuleResult {
            changed: false,
            failed: false,
            msg: Some("cancelled".to_string()),
            key,
            data: None,
        },
        Ok(Some((cm, state, spec))) => {
            let outcome = op(&cm, state, spec);
            if let Err(e) = cm.close() {
                tracing::warn!("cannot close session: {e}");
            }
            outcome.unwrap_or_else(|e| ModuleResult::failed(key, cm.changed(), format!("{e:#}")))
        }
    };

    if result.failed {
        tracing::error!(module = key, "{}", result.msg.as_deref().unwrap_or_default());
    }
    app.renderer().render_result(&result)?;
    Ok(if result.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Parse arguments, confirm deletions, connect. `None` when the user
/// declined.
fn prepare<S: DeserializeOwned + Default>(
    app: &AppContext,
    cmd: &ModuleCmd,
) -> Result<Option<(Manager, State, S)>> {
    let ModuleArgs {
        connection_info,
        state,
        spec,
    } = read_args::<S>(&cmd.args)?;

    if state == State::Absent {
        let prompt = format!(
            "Delete the resource described in {} from {}?",
            cmd.args.display(),
            connection_info.address
        );
        if !app.confirm(&prompt)? {
            return Ok(None);
        }
    }

    let cm = connect(app, connection_info)?;
    tracing::info!(
        address = %cm.base_url(),
        connection_type = %cm.connection_type(),
        state = %state,
        "module start"
    );
    Ok(Some((cm, state, spec)))
}
