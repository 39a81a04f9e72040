//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`: never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::domain::config::VspConfig;
use crate::domain::http::{HttpRequest, HttpResponse};

// ── HTTP Port ─────────────────────────────────────────────────────────────────

/// Sends one request and returns the response, whatever its status code.
///
/// Implementations return `Err` only when no response was received
/// (connect, TLS, timeout). Non-2xx responses are `Ok`.
#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport {
    /// Send `request` and wait for the full response.
    ///
    /// # Errors
    ///
    /// Returns an error if the server could not be reached.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

// ── Clock Port ────────────────────────────────────────────────────────────────

/// Blocks the calling thread between poll attempts.
#[cfg_attr(test, mockall::automock)]
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Abstracts persistence of the user configuration file.
pub trait ConfigStore {
    /// Load the configuration, falling back to defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<VspConfig>;
    /// Persist `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &VspConfig) -> Result<()>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if no location can be determined.
    fn path(&self) -> Result<PathBuf>;
}
