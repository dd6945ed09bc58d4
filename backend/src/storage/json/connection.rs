use anyhow::Result;
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::traits::KeyValueStorage;

/// Overrides every other way of choosing the data directory
pub const DATA_DIR_ENV_VAR: &str = "CHORE_TRACKER_DATA_DIR";

const REDIRECT_FILE_NAME: &str = ".chore_tracker_redirect";
const DEFAULT_DIRECTORY_NAME: &str = "Chore Tracker";
const VALUE_EXTENSION: &str = "json";

/// JsonConnection is a file-backed key-value store: each key is one
/// `<key>.json` file in the base directory.
#[derive(Clone, Debug)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Create a new connection with a base directory, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self { base_directory: base_path })
    }

    /// Create a connection in the default data directory.
    ///
    /// Resolution order: `CHORE_TRACKER_DATA_DIR`, then a redirect file inside
    /// `~/Documents/Chore Tracker`, then that directory itself.
    pub fn new_default() -> Result<Self> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV_VAR) {
            if !dir.trim().is_empty() {
                info!("Using data directory from {}: {}", DATA_DIR_ENV_VAR, dir);
                return Self::new(dir.trim());
            }
        }

        let documents_dir = dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        let default_data_dir = documents_dir.join(DEFAULT_DIRECTORY_NAME);

        let redirect_file = default_data_dir.join(REDIRECT_FILE_NAME);
        let actual_data_dir = if redirect_file.exists() {
            match fs::read_to_string(&redirect_file) {
                Ok(redirected_path) => {
                    let path = PathBuf::from(redirected_path.trim());
                    if path.exists() {
                        info!("Found redirect file, using data directory: {}", path.display());
                        path
                    } else {
                        warn!(
                            "Redirect file points to non-existent directory: {}. Using default.",
                            path.display()
                        );
                        default_data_dir
                    }
                }
                Err(e) => {
                    error!("Failed to read redirect file: {}. Using default directory.", e);
                    default_data_dir
                }
            }
        } else {
            debug!("No redirect file, using default data directory: {}", default_data_dir.display());
            default_data_dir
        };

        Self::new(actual_data_dir)
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Keys map straight to file names, so anything path-like is rejected
    fn value_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(anyhow::anyhow!("Invalid storage key: {:?}", key));
        }
        Ok(self.base_directory.join(format!("{}.{}", key, VALUE_EXTENSION)))
    }
}

impl KeyValueStorage for JsonConnection {
    fn put_value(&self, key: &str, value: &str) -> Result<()> {
        let path = self.value_path(key)?;
        if !self.base_directory.exists() {
            fs::create_dir_all(&self.base_directory)?;
        }

        // Write to a temp file, then rename, so a crash never leaves half a value
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, value)?;
        fs::rename(&temp_path, &path)?;

        debug!("Stored {} bytes under key {}", value.len(), key);
        Ok(())
    }

    fn get_value(&self, key: &str) -> Result<Option<String>> {
        let path = self.value_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn delete_value(&self, key: &str) -> Result<bool> {
        let path = self.value_path(key)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.base_directory)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
