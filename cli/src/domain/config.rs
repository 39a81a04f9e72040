//! Domain types and validators for `vsp` configuration.
//!
//! Pure functions only: no I/O, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::poll::PollPolicy;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "polling.interval_secs",
    "polling.max_attempts",
    "http.timeout_secs",
];

const MAX_INTERVAL_SECS: u64 = 600;
const MAX_ATTEMPTS: u32 = 10_000;
const MAX_TIMEOUT_SECS: u64 = 3600;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.vsp/config.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VspConfig {
    /// Job and pair-status polling.
    pub polling: PollingConfig,
    /// HTTP transport settings.
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            max_attempts: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout, covering connect and read.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

impl VspConfig {
    #[must_use]
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.polling.interval_secs),
            self.polling.max_attempts,
        )
    }

    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Current value of a whitelisted key, as text.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "polling.interval_secs" => Some(self.polling.interval_secs.to_string()),
            "polling.max_attempts" => Some(self.polling.max_attempts.to_string()),
            "http.timeout_secs" => Some(self.http.timeout_secs.to_string()),
            _ => None,
        }
    }

    /// Set a whitelisted key from text, validating it first.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        // Both validators passed, so the parses below cannot fail.
        match key {
            "polling.interval_secs" => self.polling.interval_secs = value.parse()?,
            "polling.max_attempts" => self.polling.max_attempts = value.parse()?,
            "http.timeout_secs" => self.http.timeout_secs = value.parse()?,
            _ => {}
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let in_range = match key {
        "polling.interval_secs" => value
            .parse::<u64>()
            .is_ok_and(|v| (1..=MAX_INTERVAL_SECS).contains(&v)),
        "polling.max_attempts" => value
            .parse::<u32>()
            .is_ok_and(|v| (1..=MAX_ATTEMPTS).contains(&v)),
        "http.timeout_secs" => value
            .parse::<u64>()
            .is_ok_and(|v| (1..=MAX_TIMEOUT_SECS).contains(&v)),
        _ => true,
    };
    if !in_range {
        let max = match key {
            "polling.interval_secs" => MAX_INTERVAL_SECS,
            "polling.max_attempts" => u64::from(MAX_ATTEMPTS),
            _ => MAX_TIMEOUT_SECS,
        };
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            expected: format!("Expected a whole number between 1 and {max}"),
        }
        .into());
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
