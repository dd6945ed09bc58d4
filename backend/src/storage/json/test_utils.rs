/// Test utilities with RAII cleanup
///
/// Every storage test gets its own temporary data directory that is removed
/// when the environment is dropped, even if the test panics.
use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::connection::JsonConnection;
use super::global_config_repository::GlobalConfigRepository;
use super::state_repository::StateRepository;

pub struct TestEnvironment {
    /// Kept alive so the directory is not removed before drop
    _temp_dir: TempDir,
    pub connection: JsonConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = JsonConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }

    pub fn state_repository(&self) -> StateRepository<JsonConnection> {
        StateRepository::new(self.connection.clone())
    }

    pub fn global_config_repository(&self) -> GlobalConfigRepository {
        GlobalConfigRepository::new(self.connection.clone())
    }
}
