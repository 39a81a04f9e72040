//! Host group module arguments, WWN handling and change planning.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use vsp_common::{HostGroupDetails, LdevId};

use crate::domain::error::ValidationError;

static WWN_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern: cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(
        r"(?x)
        ^(?:0x|0X)?(?:[0-9A-Fa-f]{2})
        (?:(?:[\.:\-])?[0-9A-Fa-f]{2}){7}$
        ",
    )
    .expect("valid regex")
});

static PORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: this is a compile-time constant pattern: cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^CL[0-9A-H]{1,2}-[A-Z]$").expect("valid regex")
});

/// Canonical form of a WWN: 16 lowercase hex digits, no separators.
///
/// # Errors
///
/// Returns an error if `wwn` is not 8 hex octets, optionally `0x`-prefixed
/// and separated by `:`, `-` or `.`.
pub fn normalize_wwn(wwn: &str) -> Result<String, ValidationError> {
    let trimmed = wwn.trim();
    if !WWN_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidField {
            field: "wwns",
            reason: format!("'{wwn}' is not a 16 hex digit WWN"),
        });
    }
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    Ok(digits
        .chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_lowercase())
        .collect())
}

/// Canonical form of a storage port id (`cl1-a` → `CL1-A`).
///
/// # Errors
///
/// Returns an error if `port` is not of the `CLx-y` form.
pub fn normalize_port(port: &str) -> Result<String, ValidationError> {
    let upper = port.trim().to_ascii_uppercase();
    if PORT_RE.is_match(&upper) {
        Ok(upper)
    } else {
        Err(ValidationError::InvalidField {
            field: "port",
            reason: format!("'{port}' is not a port id such as CL1-A"),
        })
    }
}

/// `spec` of the `host-group` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostGroupSpec {
    pub port: Option<String>,
    pub name: Option<String>,
    pub host_group_number: Option<u32>,
    pub host_mode: Option<String>,
    pub host_mode_options: Option<Vec<u32>>,
    #[serde(default)]
    pub wwns: Vec<String>,
    /// LDEVs to present; the array picks the LUN number.
    #[serde(default)]
    pub luns: Vec<LdevId>,
    /// Remove WWNs and LUN paths not listed in the spec.
    #[serde(default)]
    pub exclusive: bool,
}

impl HostGroupSpec {
    /// Normalises port, WWNs and host mode in place.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        let port = self.port.as_deref().ok_or(ValidationError::MissingField("port"))?;
        self.port = Some(normalize_port(port)?);
        if self.name.is_none() && self.host_group_number.is_none() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.host_group_number.is_some_and(|n| n > 254) {
            return Err(ValidationError::InvalidField {
                field: "host_group_number",
                reason: "must be between 0 and 254".to_string(),
            });
        }
        let mut wwns: Vec<String> = Vec::with_capacity(self.wwns.len());
        for wwn in &self.wwns {
            let wwn = normalize_wwn(wwn)?;
            if !wwns.contains(&wwn) {
                wwns.push(wwn);
            }
        }
        self.wwns = wwns;
        if let Some(mode) = &mut self.host_mode {
            *mode = mode.trim().to_ascii_uppercase();
        }
        Ok(())
    }

    /// Port after [`validate`](Self::validate).
    #[must_use]
    pub fn port_id(&self) -> &str {
        self.port.as_deref().unwrap_or_default()
    }

    /// Body of `POST v1/objects/host-groups`.
    ///
    /// # Errors
    ///
    /// Returns an error when the group has no name.
    pub fn create_request(&self) -> Result<CreateHostGroupRequest, ValidationError> {
        Ok(CreateHostGroupRequest {
            port_id: self.port_id().to_string(),
            host_group_name: self.name.clone().ok_or(ValidationError::MissingField("name"))?,
            host_group_number: self.host_group_number,
            host_mode: self.host_mode.clone(),
            host_mode_options: self.host_mode_options.clone(),
        })
    }
}

/// `spec` of the `host-group-facts` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostGroupFactsSpec {
    #[serde(default)]
    pub ports: Vec<String>,
    pub name: Option<String>,
    /// Only LU paths of this LDEV (`"0:A"` or `10`).
    pub lun: Option<LdevId>,
}

/// Keep only host groups that present `ldev`, and only those paths.
#[must_use]
pub fn filter_by_lun(groups: Vec<HostGroupDetails>, ldev: LdevId) -> Vec<HostGroupDetails> {
    groups
        .into_iter()
        .filter_map(|mut group| {
            group.lun_paths.retain(|p| p.ldev_id == ldev.get());
            (!group.lun_paths.is_empty()).then_some(group)
        })
        .collect()
}

// ── Payloads ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHostGroupRequest {
    pub port_id: String,
    pub host_group_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_group_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_mode_options: Option<Vec<u32>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWwnRequest {
    pub host_wwn: String,
    pub port_id: String,
    pub host_group_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLunRequest {
    pub port_id: String,
    pub host_group_number: u32,
    pub ldev_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHostGroupRequest {
    pub host_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_mode_options: Option<Vec<u32>>,
}

// ── Planning ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostGroupChange {
    SetHostMode(UpdateHostGroupRequest),
    AddWwn(String),
    RemoveWwn(String),
    MapLdev(u32),
    UnmapLun { lun: u32, ldev_id: u32 },
}

impl fmt::Display for HostGroupChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetHostMode(req) => write!(f, "set host mode {}", req.host_mode),
            Self::AddWwn(wwn) => write!(f, "add WWN {wwn}"),
            Self::RemoveWwn(wwn) => write!(f, "remove WWN {wwn}"),
            Self::MapLdev(ldev) => write!(f, "map LDEV {ldev}"),
            Self::UnmapLun { lun, ldev_id } => write!(f, "unmap LUN {lun} (LDEV {ldev_id})"),
        }
    }
}

/// Changes that bring `current` in line with `spec`.
#[must_use]
pub fn plan(current: &HostGroupDetails, spec: &HostGroupSpec) -> Vec<HostGroupChange> {
    let mut changes = Vec::new();
    let group = &current.host_group;

    let mode_differs = spec
        .host_mode
        .as_ref()
        .is_some_and(|m| group.host_mode.as_deref() != Some(m.as_str()));
    let options_differ = spec.host_mode_options.as_ref().is_some_and(|want| {
        let mut want = want.clone();
        let mut have = group.host_mode_options.clone();
        want.sort_unstable();
        have.sort_unstable();
        want != have
    });
    if mode_differs || options_differ {
        let host_mode = spec
            .host_mode
            .clone()
            .or_else(|| group.host_mode.clone())
            .unwrap_or_default();
        changes.push(HostGroupChange::SetHostMode(UpdateHostGroupRequest {
            host_mode,
            host_mode_options: spec.host_mode_options.clone(),
        }));
    }

    let have_wwns: Vec<String> = current
        .wwns
        .iter()
        .map(|w| w.host_wwn.to_ascii_lowercase())
        .collect();
    for wwn in &spec.wwns {
        if !have_wwns.contains(wwn) {
            changes.push(HostGroupChange::AddWwn(wwn.clone()));
        }
    }
    if spec.exclusive {
        for wwn in have_wwns.iter().filter(|w| !spec.wwns.contains(w)) {
            changes.push(HostGroupChange::RemoveWwn(wwn.clone()));
        }
    }

    for ldev in &spec.luns {
        if !current.lun_paths.iter().any(|p| p.ldev_id == ldev.get()) {
            changes.push(HostGroupChange::MapLdev(ldev.get()));
        }
    }
    if spec.exclusive {
        for path in &current.lun_paths {
            if !spec.luns.iter().any(|l| l.get() == path.ldev_id) {
                changes.push(HostGroupChange::UnmapLun {
                    lun: path.lun,
                    ldev_id: path.ldev_id,
                });
            }
        }
    }

    changes
}
