//! # Global Config Repository
//!
//! Manages `global_config.yaml` at the root of the data directory.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── global_config.yaml        ← This module manages this file
//! └── chore_tracker_state.json
//! ```
//!
//! ## YAML Format
//!
//! ```yaml
//! data_format_version: "3"
//! backup_directory: "/home/me/Backups"
//! created_at: "2026-10-19T19:30:00Z"
//! updated_at: "2026-10-19T19:35:00Z"
//! ```

use anyhow::Result;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::connection::JsonConnection;

const GLOBAL_CONFIG_FILE_NAME: &str = "global_config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Data format version for future migrations
    pub data_format_version: String,
    /// Where `export` writes backups when no directory is given
    #[serde(default)]
    pub backup_directory: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            data_format_version: shared::CURRENT_SCHEMA_VERSION.to_string(),
            backup_directory: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Clone)]
pub struct GlobalConfigRepository {
    connection: JsonConnection,
}

impl GlobalConfigRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }

    fn global_config_path(&self) -> PathBuf {
        self.connection.base_directory().join(GLOBAL_CONFIG_FILE_NAME)
    }

    /// Load the config, creating it with defaults on first use
    pub fn get_global_config(&self) -> Result<GlobalConfig> {
        let config_path = self.global_config_path();

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)?;
            let config: GlobalConfig = serde_yaml::from_str(&yaml_content)?;
            debug!("Loaded global config from {:?}", config_path);
            Ok(config)
        } else {
            let config = GlobalConfig::default();
            self.save_global_config(&config)?;
            info!("Created default global config at {:?}", config_path);
            Ok(config)
        }
    }

    pub fn set_backup_directory(&self, directory: Option<String>) -> Result<()> {
        let mut config = self.get_global_config()?;
        config.backup_directory = directory.filter(|d| !d.trim().is_empty());
        self.update_global_config(&config)
    }

    /// Save the config, bumping `updated_at`
    pub fn update_global_config(&self, config: &GlobalConfig) -> Result<()> {
        let mut config = config.clone();
        config.updated_at = Utc::now().to_rfc3339();
        self.save_global_config(&config)
    }

    fn save_global_config(&self, config: &GlobalConfig) -> Result<()> {
        let config_path = self.global_config_path();
        let base_dir = self.connection.base_directory();

        if !base_dir.exists() {
            fs::create_dir_all(base_dir)?;
            info!("Created base data directory: {:?}", base_dir);
        }

        let yaml_content = serde_yaml::to_string(config)?;

        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved global config to {:?}", config_path);
        Ok(())
    }
}
