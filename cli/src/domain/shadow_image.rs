//! ShadowImage (local clone) pair arguments and state transitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use vsp_common::{LdevId, PairStatus};

use crate::domain::args::State;
use crate::domain::error::ValidationError;

pub const DEFAULT_COPY_PACE: u8 = 3;

/// Copy speed bucket the array accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPace {
    Slower,
    Medium,
    Faster,
}

impl CopyPace {
    /// Bucket for a 1..=15 track-size pace.
    ///
    /// # Errors
    ///
    /// Returns an error outside 1..=15.
    pub fn from_level(level: u8) -> Result<Self, ValidationError> {
        match level {
            1..=5 => Ok(Self::Slower),
            6..=10 => Ok(Self::Medium),
            11..=15 => Ok(Self::Faster),
            _ => Err(ValidationError::InvalidField {
                field: "copy_pace",
                reason: format!("{level} is outside 1..=15"),
            }),
        }
    }

    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Slower => "SLOWER",
            Self::Medium => "MEDIUM",
            Self::Faster => "FASTER",
        }
    }
}

/// `spec` of the `shadow-image` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShadowImageSpec {
    pub pvol: Option<LdevId>,
    pub svol: Option<LdevId>,
    pub copy_group_name: Option<String>,
    pub copy_pair_name: Option<String>,
    pub copy_pace: Option<u8>,
    /// Split right after the initial copy reaches PAIR.
    #[serde(default)]
    pub auto_split: bool,
}

impl ShadowImageSpec {
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.pvol.ok_or(ValidationError::MissingField("pvol"))?;
        let svol = self.svol.ok_or(ValidationError::MissingField("svol"))?;
        if self.pvol == Some(svol) {
            return Err(ValidationError::InvalidField {
                field: "svol",
                reason: "must differ from pvol".to_string(),
            });
        }
        self.pace()?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error when `copy_pace` is outside 1..=15.
    pub fn pace(&self) -> Result<CopyPace, ValidationError> {
        CopyPace::from_level(self.copy_pace.unwrap_or(DEFAULT_COPY_PACE))
    }

    /// `(pvol, svol)` after [`validate`](Self::validate).
    #[must_use]
    pub fn volumes(&self) -> (u32, u32) {
        (
            self.pvol.map_or(0, LdevId::get),
            self.svol.map_or(0, LdevId::get),
        )
    }

    /// Body of `POST v1/objects/local-clone-copypairs`.
    ///
    /// # Errors
    ///
    /// Returns an error when `copy_pace` is invalid.
    pub fn create_request(&self) -> Result<CreatePairRequest, ValidationError> {
        let (pvol, svol) = self.volumes();
        let copy_group_name = self
            .copy_group_name
            .clone()
            .unwrap_or_else(|| format!("SI_{pvol}"));
        let copy_pair_name = self
            .copy_pair_name
            .clone()
            .unwrap_or_else(|| format!("SI_{pvol}_{svol}"));
        Ok(CreatePairRequest {
            copy_group_name,
            copy_pair_name,
            replication_type: "SI",
            pvol_ldev_id: pvol,
            svol_ldev_id: svol,
            is_new_group_creation: self.copy_group_name.is_none(),
            copy_pace: self.pace()?.as_wire(),
            auto_split: self.auto_split,
        })
    }
}

/// `spec` of the `shadow-image-facts` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShadowImageFactsSpec {
    pub pvol: Option<LdevId>,
}

// ── Payloads ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePairRequest {
    pub copy_group_name: String,
    pub copy_pair_name: String,
    pub replication_type: &'static str,
    pub pvol_ldev_id: u32,
    pub svol_ldev_id: u32,
    pub is_new_group_creation: bool,
    pub copy_pace: &'static str,
    pub auto_split: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairActionRequest {
    pub parameters: PairActionParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairActionParameters {
    pub copy_pace: &'static str,
}

// ── Transitions ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairAction {
    Split,
    Resync,
}

impl fmt::Display for PairAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Split => f.write_str("split"),
            Self::Resync => f.write_str("resync"),
        }
    }
}

/// Status a pair settles in once `state` has been applied.
#[must_use]
pub fn target_status(state: State, auto_split: bool) -> PairStatus {
    match state {
        State::Split => PairStatus::Split,
        State::Present if auto_split => PairStatus::Split,
        _ => PairStatus::Pair,
    }
}

/// Action needed to move an existing pair towards `state`.
///
/// # Errors
///
/// Returns an error when the pair's status does not allow the transition.
pub fn transition(current: &PairStatus, state: State) -> Result<Option<PairAction>, ValidationError> {
    let refuse = || ValidationError::InvalidField {
        field: "state",
        reason: format!("cannot {state} a pair in status {current}"),
    };
    match (state, current) {
        (State::Split, PairStatus::Split) | (State::Resync, PairStatus::Pair | PairStatus::Copy) => {
            Ok(None)
        }
        (State::Split, PairStatus::Pair | PairStatus::Copy) => Ok(Some(PairAction::Split)),
        (State::Resync, PairStatus::Split | PairStatus::Suspended) => Ok(Some(PairAction::Resync)),
        (State::Split | State::Resync, _) => Err(refuse()),
        (State::Present | State::Absent, _) => Ok(None),
    }
}
