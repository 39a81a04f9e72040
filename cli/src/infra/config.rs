//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::application::ports::ConfigStore;
use crate::domain::config::VspConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "VSP_CONFIG";
/// Storage management home; when set, the config file lives under it.
pub const HOME_ENV: &str = "HV_STORAGE_MGMT_PATH";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
pub struct YamlConfigStore;

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<VspConfig> {
        read_config(&self.path()?)
    }

    fn save(&self, config: &VspConfig) -> Result<()> {
        write_config(&self.path()?, config)
    }

    fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        if let Some(home) = std::env::var_os(HOME_ENV) {
            return Ok(PathBuf::from(home).join("vsp").join("config.yaml"));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".vsp").join("config.yaml"))
    }
}

fn read_config(path: &Path) -> Result<VspConfig> {
    if !path.exists() {
        return Ok(VspConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}

fn write_config(path: &Path, config: &VspConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let content = serde_yaml::to_string(config).context("cannot serialize config")?;
    std::fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("cannot set permissions on {}", path.display()))?;
    }
    Ok(())
}
