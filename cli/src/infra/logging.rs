//! `tracing` subscriber setup: a run log and an audit log on disk.
//!
//! Events with target `audit` (every mutating REST call) go to both files;
//! everything else passing the filter goes to the run log only. When the log
//! directory is unusable, warnings and errors go to stderr instead.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::filter::{EnvFilter, LevelFilter, filter_fn};
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{Layer as _, fmt};

/// Log directory override.
pub const LOG_DIR_ENV: &str = "HV_STORAGE_MGMT_VAR_LOG_PATH";
/// Filter override, checked before `RUST_LOG`.
pub const LOG_FILTER_ENV: &str = "VSP_LOG";

pub const DEFAULT_LOG_DIR: &str = "/var/log/hitachivantara/ansible/storage";
pub const LOG_FILE: &str = "vsp.log";
pub const AUDIT_LOG_FILE: &str = "vsp_audit.log";

/// Target the connection manager logs mutating calls under.
pub const AUDIT_TARGET: &str = "audit";

/// Where log files go.
#[must_use]
pub fn log_dir() -> PathBuf {
    std::env::var_os(LOG_DIR_ENV).map_or_else(|| PathBuf::from(DEFAULT_LOG_DIR), PathBuf::from)
}

fn filter(verbose: bool) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default))
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open {}", path.display()))
}

fn open_logs(dir: &Path) -> Result<(File, File)> {
    std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    Ok((
        open_append(&dir.join(LOG_FILE))?,
        open_append(&dir.join(AUDIT_LOG_FILE))?,
    ))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool) {
    let dir = log_dir();
    match open_logs(&dir) {
        Ok((run, audit)) => {
            let run_layer = fmt::layer()
                .with_writer(Mutex::new(run))
                .with_ansi(false)
                .with_filter(filter(verbose));
            let audit_layer = fmt::layer()
                .with_writer(Mutex::new(audit))
                .with_ansi(false)
                .with_target(false)
                .with_filter(filter_fn(|meta| meta.target() == AUDIT_TARGET));
            let _ = tracing_subscriber::registry()
                .with(run_layer)
                .with(audit_layer)
                .try_init();
        }
        Err(e) => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(LevelFilter::WARN);
            if tracing_subscriber::registry()
                .with(stderr_layer)
                .try_init()
                .is_ok()
            {
                tracing::warn!("file logging disabled: {e:#}");
            }
        }
    }
}
