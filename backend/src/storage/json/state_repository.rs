//! # State Repository
//!
//! Persists the whole [`AppState`] as one JSON value under a fixed key.
//!
//! ## Business Rules
//!
//! - Loading never fails. A missing value yields the default state.
//! - A value that cannot be decoded is logged as a [`StorageDecodeError`],
//!   copied aside under `<key>.corrupt` so it can be recovered by hand, and
//!   replaced in memory by the default state.
//! - Older blobs missing newer collections decode with those collections empty.

use anyhow::Result;
use log::{debug, error, info, warn};
use shared::AppState;
use thiserror::Error;

use crate::storage::traits::{KeyValueStorage, StateStorage};

pub const STATE_KEY: &str = "chore_tracker_state";

#[derive(Debug, Error)]
#[error("Stored state under '{key}' could not be decoded: {source}")]
pub struct StorageDecodeError {
    pub key: String,
    #[source]
    pub source: serde_json::Error,
}

#[derive(Clone)]
pub struct StateRepository<S: KeyValueStorage> {
    store: S,
    key: String,
}

impl<S: KeyValueStorage> StateRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, STATE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn corrupt_key(&self) -> String {
        format!("{}.corrupt", self.key)
    }

    fn decode(&self, raw: &str) -> Result<AppState, StorageDecodeError> {
        serde_json::from_str(raw).map_err(|source| StorageDecodeError {
            key: self.key.clone(),
            source,
        })
    }

    fn quarantine(&self, raw: &str) {
        let corrupt_key = self.corrupt_key();
        match self.store.put_value(&corrupt_key, raw) {
            Ok(()) => warn!("Preserved undecodable state under key {}", corrupt_key),
            Err(e) => error!("Failed to preserve undecodable state: {}", e),
        }
    }
}

impl<S: KeyValueStorage> StateStorage for StateRepository<S> {
    fn load(&self) -> AppState {
        let raw = match self.store.get_value(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("No saved state found, starting fresh");
                return AppState::default();
            }
            Err(e) => {
                error!("Failed to read saved state: {}", e);
                return AppState::default();
            }
        };

        match self.decode(&raw) {
            Ok(state) => {
                debug!(
                    "Loaded state v{}: {} kids, {} chores, {} completions",
                    state.schema_version,
                    state.kids.len(),
                    state.chores.len(),
                    state.completions.len()
                );
                state
            }
            Err(e) => {
                error!("{}", e);
                self.quarantine(&raw);
                AppState::default()
            }
        }
    }

    fn save(&self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.store.put_value(&self.key, &json)?;
        debug!("Saved state ({} bytes)", json.len());
        Ok(())
    }
}
