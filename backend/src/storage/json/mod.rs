//! JSON file storage
//!
//! A flat key-value store of JSON files plus the repositories built on it.

pub mod connection;
pub mod global_config_repository;
pub mod state_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::JsonConnection;
pub use global_config_repository::{GlobalConfig, GlobalConfigRepository};
pub use state_repository::{StateRepository, StorageDecodeError, STATE_KEY};
