//! Configuration loading

use anyhow::Result;
use indi_core::{DeviceMode, DeviceRole, Profile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub profiles: ProfilesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name used on the wire
    #[serde(default = "default_name")]
    pub name: String,
    /// Standard property set to start from
    #[serde(default)]
    pub role: DeviceRole,
    /// Client instances re-announce vectors after sending new values
    #[serde(default)]
    pub mode: DeviceMode,
    /// Request BLOB delivery along with other traffic
    #[serde(default)]
    pub enable_blobs: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            role: DeviceRole::default(),
            mode: DeviceMode::default(),
            enable_blobs: false,
        }
    }
}

fn default_name() -> String {
    "Simulator".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfilesConfig {
    /// Extra profile vectors applied on top of the role table
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl ProfilesConfig {
    pub fn load(&self) -> Result<Option<Profile>> {
        match &self.path {
            Some(path) => {
                let profile = Profile::from_file(path)?;
                info!(
                    path = %path.display(),
                    vectors = profile.vectors.len(),
                    "Loaded profile"
                );
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }
}

/// Load configuration from file, falling back to defaults
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}
