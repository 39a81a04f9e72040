//! Module-arguments document: connection, desired state and resource spec.

use std::fmt;

use serde::Deserialize;

use crate::domain::connection::ConnectionInfo;
use crate::domain::error::ValidationError;

/// Requested state of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
    Split,
    Resync,
}

impl State {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Split => "split",
            Self::Resync => "resync",
        }
    }

    /// Narrow to the two states every resource supports.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedState`] for pair-only states.
    pub fn ensure(self) -> Result<Ensure, ValidationError> {
        match self {
            Self::Present => Ok(Ensure::Present),
            Self::Absent => Ok(Ensure::Absent),
            other => Err(ValidationError::UnsupportedState {
                state: other.as_str().to_string(),
            }),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Existence requested of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ensure {
    Present,
    Absent,
}

/// One module invocation as read from `--args`.
///
/// `spec` may be omitted for facts modules that list everything.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "S: Deserialize<'de> + Default"))]
pub struct ModuleArgs<S> {
    pub connection_info: ConnectionInfo,
    #[serde(default)]
    pub state: State,
    #[serde(default)]
    pub spec: S,
}
