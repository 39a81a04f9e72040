//! Pool module arguments and change planning.

use std::fmt;

use serde::{Deserialize, Serialize};
use vsp_common::{LdevId, Pool};

use crate::domain::args::Ensure;
use crate::domain::error::ValidationError;

/// Kind of pool to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PoolType {
    /// Dynamic Provisioning.
    #[default]
    Hdp,
    /// Dynamic Tiering.
    Hdt,
    /// Thin Image snapshot pool.
    Hti,
}

impl PoolType {
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Hdp => "HDP",
            Self::Hdt => "HDT",
            Self::Hti => "HTI",
        }
    }
}

/// `spec` of the `pool` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolSpec {
    pub id: Option<u32>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub pool_type: Option<PoolType>,
    /// LDEVs that must be pool volumes of this pool.
    #[serde(default)]
    pub ldev_ids: Vec<LdevId>,
    pub warning_threshold: Option<u32>,
    pub depletion_threshold: Option<u32>,
}

impl PoolSpec {
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, ensure: Ensure) -> Result<(), ValidationError> {
        if self.id.is_none() && self.name.is_none() {
            return Err(ValidationError::MissingField("id"));
        }
        for (field, value) in [
            ("warning_threshold", self.warning_threshold),
            ("depletion_threshold", self.depletion_threshold),
        ] {
            if value.is_some_and(|v| !(1..=100).contains(&v)) {
                return Err(ValidationError::InvalidField {
                    field,
                    reason: "must be a percentage between 1 and 100".to_string(),
                });
            }
        }
        if let (Some(w), Some(d)) = (self.warning_threshold, self.depletion_threshold)
            && w > d
        {
            return Err(ValidationError::InvalidField {
                field: "warning_threshold",
                reason: "must not exceed depletion_threshold".to_string(),
            });
        }
        if ensure == Ensure::Present && self.pool_type.is_some() && self.ldev_ids.is_empty() {
            return Err(ValidationError::MissingField("ldev_ids"));
        }
        Ok(())
    }

    /// Body of `POST v1/objects/pools`.
    ///
    /// # Errors
    ///
    /// Returns an error when the name or pool volumes are missing.
    pub fn create_request(&self) -> Result<CreatePoolRequest, ValidationError> {
        let name = self.name.clone().ok_or(ValidationError::MissingField("name"))?;
        if self.ldev_ids.is_empty() {
            return Err(ValidationError::MissingField("ldev_ids"));
        }
        Ok(CreatePoolRequest {
            pool_id: self.id,
            pool_name: name,
            pool_type: self.pool_type.unwrap_or_default().as_wire(),
            ldev_ids: self.ldev_ids.iter().map(|l| l.get()).collect(),
            warning_threshold: self.warning_threshold,
            depletion_threshold: self.depletion_threshold,
        })
    }
}

/// `spec` of the `pool-facts` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoolFactsSpec {
    pub id: Option<u32>,
    pub name: Option<String>,
}

/// A pool with the requested LDEVs that are already its pool volumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolState {
    #[serde(flatten)]
    pub pool: Pool,
    pub pool_volume_ids: Vec<u32>,
}

// ── Payloads ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<u32>,
    pub pool_name: String,
    pub pool_type: &'static str,
    pub ldev_ids: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depletion_threshold: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePoolRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depletion_threshold: Option<u32>,
}

impl UpdatePoolRequest {
    fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandPoolRequest {
    pub parameters: ExpandPoolParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandPoolParameters {
    pub ldev_ids: Vec<u32>,
}

// ── Planning ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolChange {
    AddVolumes(Vec<u32>),
    Update(UpdatePoolRequest),
}

impl fmt::Display for PoolChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddVolumes(ids) => write!(f, "add pool volumes {ids:?}"),
            Self::Update(update) => {
                let mut parts = Vec::new();
                if let Some(name) = &update.pool_name {
                    parts.push(format!("name '{name}'"));
                }
                if let Some(w) = update.warning_threshold {
                    parts.push(format!("warning threshold {w}%"));
                }
                if let Some(d) = update.depletion_threshold {
                    parts.push(format!("depletion threshold {d}%"));
                }
                write!(f, "set {}", parts.join(", "))
            }
        }
    }
}

/// Changes that bring `current` in line with `spec`. Pool volumes are only
/// ever added.
#[must_use]
pub fn plan(current: &PoolState, spec: &PoolSpec) -> Vec<PoolChange> {
    let mut changes = Vec::new();

    let missing: Vec<u32> = spec
        .ldev_ids
        .iter()
        .map(|l| l.get())
        .filter(|id| !current.pool_volume_ids.contains(id))
        .collect();
    if !missing.is_empty() {
        changes.push(PoolChange::AddVolumes(missing));
    }

    let pool = &current.pool;
    let mut update = UpdatePoolRequest::default();
    if let (Some(name), Some(_)) = (&spec.name, spec.id)
        && *name != pool.pool_name
    {
        update.pool_name = Some(name.clone());
    }
    if spec.warning_threshold.is_some() && spec.warning_threshold != pool.warning_threshold {
        update.warning_threshold = spec.warning_threshold;
    }
    if spec.depletion_threshold.is_some() && spec.depletion_threshold != pool.depletion_threshold {
        update.depletion_threshold = spec.depletion_threshold;
    }
    if !update.is_empty() {
        changes.push(PoolChange::Update(update));
    }

    changes
}
