//! Wire records returned by the Configuration Manager API.
//!
//! Every record deserialises from the array's camelCase JSON and serialises
//! with snake_case keys, which is the shape module results are reported in.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Emulation type the array reports for an LDEV number with no volume behind it.
pub const EMULATION_NOT_DEFINED: &str = "NOT DEFINED";

// ── Storage system ───────────────────────────────────────────────────────────

/// A storage system registered with the REST server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct StorageSystem {
    pub storage_device_id: String,
    pub model: String,
    pub serial_number: u64,
    #[serde(default)]
    pub svp_ip: Option<String>,
    #[serde(default)]
    pub ctl1_ip: Option<String>,
    #[serde(default)]
    pub ctl2_ip: Option<String>,
    #[serde(default)]
    pub dkc_micro_version: Option<String>,
}

// ── Volumes ──────────────────────────────────────────────────────────────────

/// A logical device (LDEV).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Volume {
    pub ldev_id: u32,
    pub emulation_type: String,
    #[serde(default)]
    pub block_capacity: Option<u64>,
    #[serde(default)]
    pub byte_format_capacity: Option<String>,
    #[serde(default)]
    pub num_of_used_block: Option<u64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub pool_id: Option<u32>,
    #[serde(default)]
    pub parity_group_ids: Vec<String>,
    #[serde(default)]
    pub data_reduction_mode: Option<String>,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub ports: Vec<VolumePort>,
}

impl Volume {
    /// `false` when the LDEV number is free (the array still answers a GET).
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.emulation_type != EMULATION_NOT_DEFINED
    }

    /// Whether the LDEV is a pool volume of `pool_id`.
    #[must_use]
    pub fn is_pool_volume_of(&self, pool_id: u32) -> bool {
        self.pool_id == Some(pool_id) && self.attributes.iter().any(|a| a == "POOL")
    }
}

/// A host path an LDEV is presented on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct VolumePort {
    pub port_id: String,
    pub host_group_number: u32,
    #[serde(default)]
    pub host_group_name: Option<String>,
    pub lun: u32,
}

// ── Pools ────────────────────────────────────────────────────────────────────

/// A storage pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Pool {
    pub pool_id: u32,
    pub pool_name: String,
    #[serde(default)]
    pub pool_type: Option<String>,
    #[serde(default)]
    pub pool_status: Option<String>,
    #[serde(default)]
    pub used_capacity_rate: Option<u32>,
    #[serde(default)]
    pub total_pool_capacity: Option<u64>,
    #[serde(default)]
    pub available_volume_capacity: Option<u64>,
    #[serde(default)]
    pub num_of_ldevs: Option<u32>,
    #[serde(default)]
    pub warning_threshold: Option<u32>,
    #[serde(default)]
    pub depletion_threshold: Option<u32>,
}

// ── Host groups ──────────────────────────────────────────────────────────────

/// A Fibre Channel host group on a storage port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct HostGroup {
    pub host_group_id: String,
    pub port_id: String,
    pub host_group_number: u32,
    pub host_group_name: String,
    #[serde(default)]
    pub host_mode: Option<String>,
    #[serde(default)]
    pub host_mode_options: Vec<u32>,
}

/// An initiator WWN registered to a host group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct HostWwn {
    pub host_wwn_id: String,
    pub port_id: String,
    pub host_group_number: u32,
    pub host_wwn: String,
    #[serde(default)]
    pub wwn_nickname: Option<String>,
}

/// An LU path mapping an LDEV into a host group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct LunPath {
    pub lun_id: String,
    pub port_id: String,
    pub host_group_number: u32,
    pub lun: u32,
    pub ldev_id: u32,
}

/// A host group together with its WWNs and LU paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostGroupDetails {
    #[serde(flatten)]
    pub host_group: HostGroup,
    pub wwns: Vec<HostWwn>,
    pub lun_paths: Vec<LunPath>,
}

// ── ShadowImage pairs ────────────────────────────────────────────────────────

/// Status of one side of a copy pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairStatus {
    /// Initial or resync copy in progress.
    Copy,
    /// Pair synchronised.
    Pair,
    /// Pair split (`PSUS` on the P-VOL, `SSUS` on the S-VOL).
    Split,
    /// Pair suspended by an error.
    Suspended,
    /// No pair relationship.
    Simplex,
    Other(String),
}

impl FromStr for PairStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "COPY" | "RCPY" => Self::Copy,
            "PAIR" => Self::Pair,
            "PSUS" | "SSUS" => Self::Split,
            "PSUE" | "PFUS" => Self::Suspended,
            "SMPL" => Self::Simplex,
            other => Self::Other(other.to_string()),
        })
    }
}

impl fmt::Display for PairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => f.write_str("COPY"),
            Self::Pair => f.write_str("PAIR"),
            Self::Split => f.write_str("PSUS"),
            Self::Suspended => f.write_str("PSUE"),
            Self::Simplex => f.write_str("SMPL"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

/// A ShadowImage (local clone) copy pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct LocalClonePair {
    pub local_clone_copypair_id: String,
    pub copy_group_name: String,
    pub copy_pair_name: String,
    #[serde(default)]
    pub replication_type: Option<String>,
    pub pvol_ldev_id: u32,
    pub svol_ldev_id: u32,
    pub pvol_status: String,
    #[serde(default)]
    pub svol_status: Option<String>,
    #[serde(default)]
    pub copy_progress_rate: Option<u32>,
    #[serde(default)]
    pub copy_pace: Option<String>,
    #[serde(default)]
    pub consistency_group_id: Option<u32>,
}

impl LocalClonePair {
    /// Pair status as seen from the P-VOL.
    #[must_use]
    pub fn status(&self) -> PairStatus {
        self.pvol_status
            .parse()
            .unwrap_or_else(|never: std::convert::Infallible| match never {})
    }
}

// ── NVMe ─────────────────────────────────────────────────────────────────────

/// An NVM subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct NvmSubsystem {
    pub nvm_subsystem_id: u32,
    #[serde(default)]
    pub nvm_subsystem_name: Option<String>,
    #[serde(default)]
    pub host_mode: Option<String>,
    #[serde(default)]
    pub namespace_security_setting: Option<String>,
}

/// A port attached to an NVM subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct NvmSubsystemPort {
    pub nvm_subsystem_id: u32,
    pub port_id: String,
}

/// A host NQN registered to an NVM subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct HostNqn {
    pub nvm_subsystem_id: u32,
    pub host_nqn: String,
    #[serde(default)]
    pub host_nqn_nickname: Option<String>,
}

/// A namespace exposing an LDEV through an NVM subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Namespace {
    pub nvm_subsystem_id: u32,
    pub namespace_id: u32,
    pub ldev_id: u32,
    #[serde(default)]
    pub byte_format_capacity: Option<String>,
}

/// An NVM subsystem with its ports, host NQNs and namespaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NvmSubsystemDetails {
    #[serde(flatten)]
    pub subsystem: NvmSubsystem,
    pub ports: Vec<String>,
    pub host_nqns: Vec<String>,
    pub namespaces: Vec<Namespace>,
}

// ── Jobs ─────────────────────────────────────────────────────────────────────

/// Lifecycle of an asynchronous array job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Completed,
    Failed,
    Canceled,
}

impl JobState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Error detail attached to a failed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct JobError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub solution: Option<String>,
}

/// A job (direct connection) or task (gateway connection) resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Job {
    /// Numeric on direct connections, sometimes a string on the gateway.
    #[serde(default, alias = "taskId", deserialize_with = "id_text")]
    pub job_id: String,
    #[serde(default, rename(deserialize = "self"))]
    pub self_path: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub completed_time: Option<String>,
    #[serde(default)]
    pub affected_resources: Vec<String>,
    #[serde(default)]
    pub error: Option<JobError>,
}

/// Accepts `7` and `"7"` alike.
fn id_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(text) => text,
    })
}

impl Job {
    /// The job id, falling back to the last segment of the `self` path.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        if !self.job_id.is_empty() {
            return Some(&self.job_id);
        }
        self.self_path
            .as_deref()
            .and_then(|p| p.trim_end_matches('/').rsplit('/').next())
            .filter(|s| !s.is_empty())
    }

    /// Fold the wire `status`/`state` pair into a [`JobState`].
    #[must_use]
    pub fn job_state(&self) -> JobState {
        match self.state.as_deref() {
            Some("Failed") => return JobState::Failed,
            Some("Canceled" | "Cancelled") => return JobState::Canceled,
            _ => {}
        }
        match self.status.as_str() {
            "Completed" | "Success" | "Succeeded" => JobState::Completed,
            "Failed" => JobState::Failed,
            "Canceled" | "Cancelled" => JobState::Canceled,
            _ => JobState::Running,
        }
    }

    /// Last path segment of the first affected resource, i.e. the id of the
    /// object the job created.
    #[must_use]
    pub fn affected_id(&self) -> Option<&str> {
        self.affected_resources
            .first()
            .and_then(|r| r.trim_end_matches('/').rsplit('/').next())
            .filter(|s| !s.is_empty())
    }

    /// Human readable failure reason, preferring the array's message and
    /// appending its cause and suggested solution when present.
    #[must_use]
    pub fn failure_message(&self) -> String {
        let Some(error) = &self.error else {
            return self.fallback_failure();
        };
        let mut text = match (&error.message_id, &error.message) {
            (Some(id), Some(msg)) => format!("{id}: {msg}"),
            (None, Some(msg)) => msg.clone(),
            _ => self.fallback_failure(),
        };
        if let Some(cause) = error.cause.as_deref().filter(|c| !c.is_empty()) {
            text.push_str(" (cause: ");
            text.push_str(cause);
            text.push(')');
        }
        if let Some(solution) = error.solution.as_deref().filter(|s| !s.is_empty()) {
            text.push_str(" (solution: ");
            text.push_str(solution);
            text.push(')');
        }
        text
    }

    fn fallback_failure(&self) -> String {
        format!(
            "job {} ended in state {:?}",
            self.id().unwrap_or("?"),
            self.job_state()
        )
    }
}
