//! NVM subsystem module arguments and change planning.

use std::fmt;

use serde::{Deserialize, Serialize};
use vsp_common::{LdevId, NvmSubsystemDetails};

use crate::domain::error::ValidationError;
use crate::domain::host_group::normalize_port;

/// Highest NVM subsystem id the array accepts.
pub const MAX_NVM_SUBSYSTEM_ID: u32 = 2047;

/// Checks an NVMe qualified name.
///
/// # Errors
///
/// Returns an error unless `nqn` starts with `nqn.` and has no whitespace.
pub fn validate_nqn(nqn: &str) -> Result<(), ValidationError> {
    if nqn.starts_with("nqn.") && nqn.len() > 4 && !nqn.contains(char::is_whitespace) {
        Ok(())
    } else {
        Err(ValidationError::InvalidField {
            field: "host_nqns",
            reason: format!("'{nqn}' must start with 'nqn.'"),
        })
    }
}

/// `spec` of the `nvm-subsystem` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NvmSubsystemSpec {
    pub id: Option<u32>,
    pub name: Option<String>,
    pub host_mode: Option<String>,
    pub namespace_security: Option<bool>,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub host_nqns: Vec<String>,
    /// LDEVs to expose as namespaces.
    #[serde(default)]
    pub namespaces: Vec<LdevId>,
}

impl NvmSubsystemSpec {
    /// Normalises ports and host mode in place.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        let id = self.id.ok_or(ValidationError::MissingField("id"))?;
        if id > MAX_NVM_SUBSYSTEM_ID {
            return Err(ValidationError::InvalidField {
                field: "id",
                reason: format!("must be between 0 and {MAX_NVM_SUBSYSTEM_ID}"),
            });
        }
        for nqn in &self.host_nqns {
            validate_nqn(nqn)?;
        }
        self.ports = self
            .ports
            .iter()
            .map(String::as_str)
            .map(normalize_port)
            .collect::<Result<_, _>>()?;
        if let Some(mode) = &mut self.host_mode {
            *mode = mode.trim().to_ascii_uppercase();
        }
        Ok(())
    }

    /// Body of `POST v1/objects/nvm-subsystems`.
    #[must_use]
    pub fn create_request(&self) -> CreateNvmSubsystemRequest {
        CreateNvmSubsystemRequest {
            nvm_subsystem_id: self.id.unwrap_or_default(),
            nvm_subsystem_name: self.name.clone(),
            host_mode: self.host_mode.clone(),
            namespace_security_setting: self
                .namespace_security
                .map(|on| if on { "Enable" } else { "Disable" }),
        }
    }
}

/// `spec` of the `nvm-subsystem-facts` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NvmSubsystemFactsSpec {
    pub id: Option<u32>,
    pub name: Option<String>,
}

// ── Payloads ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNvmSubsystemRequest {
    pub nvm_subsystem_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvm_subsystem_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_security_setting: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameNvmSubsystemRequest {
    pub nvm_subsystem_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNvmPortRequest {
    pub nvm_subsystem_id: u32,
    pub port_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHostNqnRequest {
    pub nvm_subsystem_id: u32,
    pub host_nqn: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddNamespaceRequest {
    pub nvm_subsystem_id: u32,
    pub ldev_id: u32,
}

// ── Planning ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NvmChange {
    Rename(String),
    AddPort(String),
    AddHostNqn(String),
    AddNamespace(u32),
}

impl fmt::Display for NvmChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename(name) => write!(f, "rename to '{name}'"),
            Self::AddPort(port) => write!(f, "add port {port}"),
            Self::AddHostNqn(nqn) => write!(f, "add host NQN {nqn}"),
            Self::AddNamespace(ldev) => write!(f, "add namespace for LDEV {ldev}"),
        }
    }
}

/// Additions that bring `current` in line with `spec`. Nothing is removed.
#[must_use]
pub fn plan(current: &NvmSubsystemDetails, spec: &NvmSubsystemSpec) -> Vec<NvmChange> {
    let mut changes = Vec::new();
    if let Some(name) = &spec.name
        && current.subsystem.nvm_subsystem_name.as_deref() != Some(name.as_str())
    {
        changes.push(NvmChange::Rename(name.clone()));
    }
    changes.extend(
        spec.ports
            .iter()
            .filter(|p| !current.ports.contains(p))
            .cloned()
            .map(NvmChange::AddPort),
    );
    changes.extend(
        spec.host_nqns
            .iter()
            .filter(|n| !current.host_nqns.contains(n))
            .cloned()
            .map(NvmChange::AddHostNqn),
    );
    changes.extend(
        spec.namespaces
            .iter()
            .map(|l| l.get())
            .filter(|id| !current.namespaces.iter().any(|ns| ns.ldev_id == *id))
            .map(NvmChange::AddNamespace),
    );
    changes
}
