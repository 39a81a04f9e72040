//! Storage system facts arguments.

use serde::Deserialize;

/// `spec` of the `storage-facts` module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageFactsSpec {
    /// Only the system with this serial number.
    pub serial: Option<u64>,
}
