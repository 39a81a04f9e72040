//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, or any I/O. All error types implement
//! `thiserror::Error` and convert to `anyhow::Error` via the `?` operator.

use thiserror::Error;

// ── REST errors ───────────────────────────────────────────────────────────────

/// Failures surfaced by the REST connection manager.
#[derive(Debug, Error)]
pub enum RestError {
    #[error("HTTP {status}{}: {message}", with_leading_space(.message_id.as_deref()))]
    Http {
        status: u16,
        message_id: Option<String>,
        message: String,
    },

    #[error("object not found: {message}")]
    NotFound { status: u16, message: String },

    #[error("cannot reach the storage REST server: {0}")]
    Transport(String),

    #[error("unexpected response from {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    #[error("job {job_id} still '{status}' after {attempts} status checks")]
    JobTimedOut {
        job_id: String,
        status: String,
        attempts: u32,
    },

    #[error("operation '{operation}' is not available over a gateway connection; connect to the array directly")]
    Unsupported { operation: &'static str },

    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

fn with_leading_space(id: Option<&str>) -> String {
    id.map(|id| format!(" {id}")).unwrap_or_default()
}

impl RestError {
    /// `true` for the typed not-found outcome.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Endpoint errors ───────────────────────────────────────────────────────────

/// Errors filling an endpoint template.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("endpoint '{template}' takes {expected} argument(s), got {got}")]
    Arity {
        template: &'static str,
        expected: usize,
        got: usize,
    },
}

// ── Validation errors ─────────────────────────────────────────────────────────

/// Errors raised before any network call when arguments are incomplete or
/// contradictory.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("connection_info.{0} is required")]
    MissingConnectionField(&'static str),

    #[error("connection_info: {0}")]
    Credentials(String),

    #[error("spec.{0} is required")]
    MissingField(&'static str),

    #[error("spec.{first} and spec.{second} are mutually exclusive")]
    Exclusive {
        first: &'static str,
        second: &'static str,
    },

    #[error("spec.{field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("state '{state}' is not supported by this module")]
    UnsupportedState { state: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
}
