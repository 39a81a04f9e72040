//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::VspConfig;

/// Load configuration.
///
/// # Errors
///
/// Returns an error if the store cannot load the file.
pub fn load_config(store: &impl ConfigStore) -> Result<VspConfig> {
    store.load()
}

/// Save configuration.
///
/// # Errors
///
/// Returns an error if the store cannot write the file.
pub fn save_config(store: &impl ConfigStore, config: &VspConfig) -> Result<()> {
    store.save(config)
}

/// Validate and persist one `key = value` setting, returning the new config.
///
/// # Errors
///
/// Returns an error if the key or value is invalid, or the store fails.
pub fn set_value(store: &impl ConfigStore, key: &str, value: &str) -> Result<VspConfig> {
    let mut config = store.load()?;
    config.set(key, value)?;
    save_config(store, &config)?;
    Ok(config)
}
