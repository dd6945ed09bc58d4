//! # Storage Traits
//!
//! Storage abstractions the controller depends on, so a different backend
//! (or an in-memory one in tests) can be swapped in without touching the
//! domain layer.

use anyhow::Result;
use shared::AppState;

/// Flat string key-value store
pub trait KeyValueStorage: Send + Sync {
    /// Store a value, overwriting any existing value for the same key
    fn put_value(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a value by its key
    fn get_value(&self, key: &str) -> Result<Option<String>>;

    /// Returns true if the key existed
    fn delete_value(&self, key: &str) -> Result<bool>;

    fn list_keys(&self) -> Result<Vec<String>>;
}

/// Whole-state persistence
pub trait StateStorage {
    /// Load the saved state. Never fails: missing or unreadable data yields
    /// the default state.
    fn load(&self) -> AppState;

    /// Best-effort save of the full state
    fn save(&self, state: &AppState) -> Result<()>;
}
