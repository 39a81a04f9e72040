//! Application service: storage system facts.

use anyhow::Result;
use vsp_common::StorageSystem;

use crate::application::ports::{HttpTransport, Sleeper};
use crate::application::services::connection_manager::ConnectionManager;
use crate::domain::endpoint::EndpointKey;
use crate::domain::storage::StorageFactsSpec;

/// Storage systems the REST server manages, optionally narrowed to one
/// serial number.
///
/// # Errors
///
/// Returns the first REST failure.
pub fn storage_facts(
    cm: &ConnectionManager<impl HttpTransport, impl Sleeper>,
    spec: &StorageFactsSpec,
) -> Result<Vec<StorageSystem>> {
    let mut systems: Vec<StorageSystem> = cm.list(EndpointKey::Storages, &[], &[])?;
    if let Some(serial) = spec.serial {
        systems.retain(|s| s.serial_number == serial);
    }
    tracing::debug!(count = systems.len(), "storage systems");
    Ok(systems)
}
