use crate::catalog::CatalogOptions;
use crate::fetch::DEFAULT_UPSTREAM_URL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding fetched datasets and the active snapshot.
    pub data_dir: PathBuf,

    /// Upstream dataset endpoint used by `lodestar fetch`.
    pub upstream_url: String,

    /// Catalog build options: overrides, allow/deny filters, preferences.
    pub catalog: CatalogOptions,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|d| d.join("lodestar"))
            .unwrap_or_else(|| PathBuf::from(".lodestar"));

        Self {
            data_dir,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            catalog: CatalogOptions::default(),
        }
    }
}

impl Config {
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("lodestar").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".lodestar/config.toml"))
    }

    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::path();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Path of the snapshot installed by `lodestar activate`.
    #[must_use]
    pub fn active_snapshot_path(&self) -> PathBuf {
        self.data_dir.join("active.json")
    }
}
