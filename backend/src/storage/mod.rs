//! # Storage Module
//!
//! Persistence for the chore tracker. The domain layer never touches storage;
//! the [`crate::Backend`] controller loads a state at startup and saves after
//! every successful transition.
//!
//! ## Module Organization
//!
//! - **traits**: `KeyValueStorage` and `StateStorage`
//! - **json**: File-backed implementation (one JSON file per key, YAML global config)

pub mod json;
pub mod traits;

pub use json::{GlobalConfig, GlobalConfigRepository, JsonConnection, StateRepository};
pub use traits::{KeyValueStorage, StateStorage};
