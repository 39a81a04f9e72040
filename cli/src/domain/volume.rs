//! Volume (LDEV) module arguments, request payloads and change planning.

use std::fmt;

use serde::{Deserialize, Serialize};
use vsp_common::{LdevId, Volume};

use crate::domain::args::Ensure;
use crate::domain::error::ValidationError;
use crate::domain::size::Capacity;

/// Longest label the array accepts.
pub const MAX_LABEL_LEN: usize = 32;

/// Capacity saving (data reduction) mode of a pool volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacitySaving {
    Disabled,
    Compression,
    CompressionDeduplication,
}

impl CapacitySaving {
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Compression => "compression",
            Self::CompressionDeduplication => "compression_deduplication",
        }
    }
}

/// `spec` of the `volume` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VolumeSpec {
    /// Omit to let the array pick a free LDEV number on create.
    pub ldev_id: Option<LdevId>,
    pub pool_id: Option<u32>,
    pub parity_group: Option<String>,
    pub size: Option<String>,
    pub name: Option<String>,
    pub capacity_saving: Option<CapacitySaving>,
    /// On delete, unmap the volume from every host path first.
    #[serde(default)]
    pub force: bool,
}

impl VolumeSpec {
    /// Checks that need no array state.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, ensure: Ensure) -> Result<(), ValidationError> {
        if self.pool_id.is_some() && self.parity_group.is_some() {
            return Err(ValidationError::Exclusive {
                first: "pool_id",
                second: "parity_group",
            });
        }
        self.capacity()?;
        if let Some(name) = &self.name
            && name.chars().count() > MAX_LABEL_LEN
        {
            return Err(ValidationError::InvalidField {
                field: "name",
                reason: format!("must be at most {MAX_LABEL_LEN} characters"),
            });
        }
        if ensure == Ensure::Absent && self.ldev_id.is_none() {
            return Err(ValidationError::MissingField("ldev_id"));
        }
        if ensure == Ensure::Present && self.ldev_id.is_none() && self.name.is_none() {
            return Err(ValidationError::InvalidField {
                field: "name",
                reason: "name or ldev_id is required to identify the volume".to_string(),
            });
        }
        Ok(())
    }

    /// Parsed `size`, if given.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` does not parse.
    pub fn capacity(&self) -> Result<Option<Capacity>, ValidationError> {
        self.size.as_deref().map(str::parse).transpose()
    }

    /// Body of `POST v1/objects/ldevs`.
    ///
    /// # Errors
    ///
    /// Returns an error when `size` or the backing pool/parity group is
    /// missing.
    pub fn create_request(&self) -> Result<CreateLdevRequest, ValidationError> {
        let capacity = self.capacity()?.ok_or(ValidationError::MissingField("size"))?;
        if self.pool_id.is_none() && self.parity_group.is_none() {
            return Err(ValidationError::InvalidField {
                field: "pool_id",
                reason: "pool_id or parity_group is required to create a volume".to_string(),
            });
        }
        Ok(CreateLdevRequest {
            ldev_id: self.ldev_id.map(LdevId::get),
            pool_id: self.pool_id,
            parity_group_id: self.parity_group.clone(),
            block_capacity: capacity.blocks(),
            data_reduction_mode: self.capacity_saving.map(CapacitySaving::as_wire),
        })
    }
}

/// `spec` of the `volume-facts` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VolumeFactsSpec {
    pub ldev_id: Option<LdevId>,
    /// First LDEV number of a listing.
    pub start_ldev_id: Option<LdevId>,
    /// Maximum number of volumes listed.
    pub count: Option<u32>,
    /// Only volumes whose label equals this.
    pub name: Option<String>,
}

impl VolumeFactsSpec {
    /// Query string of a defined-volumes listing.
    #[must_use]
    pub fn list_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("ldevOption", "defined".to_string())];
        if let Some(start) = self.start_ldev_id {
            query.push(("headLdevId", start.to_string()));
        }
        if let Some(count) = self.count {
            query.push(("count", count.to_string()));
        }
        query
    }
}

// ── Payloads ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLdevRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ldev_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parity_group_id: Option<String>,
    pub block_capacity: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_reduction_mode: Option<&'static str>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLdevRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_reduction_mode: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandLdevRequest {
    pub parameters: ExpandLdevParameters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandLdevParameters {
    pub additional_block_capacity: u64,
}

// ── Planning ─────────────────────────────────────────────────────────────────

/// One in-place change to an existing volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeChange {
    Expand { additional_blocks: u64 },
    Rename(String),
    CapacitySaving(CapacitySaving),
}

impl fmt::Display for VolumeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expand { additional_blocks } => {
                write!(f, "expand by {}", Capacity::from_blocks(*additional_blocks))
            }
            Self::Rename(name) => write!(f, "rename to '{name}'"),
            Self::CapacitySaving(mode) => write!(f, "set capacity saving to {}", mode.as_wire()),
        }
    }
}

/// Changes that bring `current` in line with `spec`.
///
/// # Errors
///
/// Returns an error when `spec` asks for a smaller volume.
pub fn plan(current: &Volume, spec: &VolumeSpec) -> Result<Vec<VolumeChange>, ValidationError> {
    let mut changes = Vec::new();

    if let Some(requested) = spec.capacity()? {
        let have = current.block_capacity.unwrap_or(0);
        let want = requested.blocks();
        if want < have {
            return Err(ValidationError::InvalidField {
                field: "size",
                reason: format!(
                    "volume {} is {}; shrinking to {} is not supported",
                    current.ldev_id,
                    Capacity::from_blocks(have),
                    Capacity::from_blocks(want)
                ),
            });
        }
        if want > have {
            changes.push(VolumeChange::Expand {
                additional_blocks: want - have,
            });
        }
    }

    if let Some(name) = &spec.name
        && current.label.as_deref() != Some(name.as_str())
    {
        changes.push(VolumeChange::Rename(name.clone()));
    }

    if let Some(saving) = spec.capacity_saving
        && current.data_reduction_mode.as_deref() != Some(saving.as_wire())
    {
        changes.push(VolumeChange::CapacitySaving(saving));
    }

    Ok(changes)
}
