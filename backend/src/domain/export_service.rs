//! Backup export and import of the whole state.
//!
//! Export produces a pretty-printed JSON snapshot plus a dated filename.
//! Import is two-step: parsing yields a [`PendingImport`] the caller can show
//! to the user, and only an explicit [`ReplaceConfirmation`] turns it into the
//! destructive `ReplaceAll` action. A file that fails to parse never gets that
//! far, so the current state is left exactly as it was.

use log::{error, info};
use shared::AppState;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::calendar;
use super::commands::Action;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Backup file is not a valid chore tracker backup: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Could not read backup file: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialized snapshot ready to be written somewhere
#[derive(Debug, Clone)]
pub struct BackupExport {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Proof that the user agreed to overwrite everything they have.
///
/// Has no `Default`; callers construct it by name.
#[derive(Debug, Clone, Copy)]
pub struct ReplaceConfirmation(());

impl ReplaceConfirmation {
    pub fn destructive_overwrite_confirmed() -> Self {
        ReplaceConfirmation(())
    }
}

/// A decoded backup that has not been applied yet
#[derive(Debug, Clone)]
pub struct PendingImport {
    state: AppState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub schema_version: u32,
    pub kids: usize,
    pub chores: usize,
    pub completions: usize,
    pub payouts: usize,
}

impl PendingImport {
    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            schema_version: self.state.schema_version,
            kids: self.state.kids.len(),
            chores: self.state.chores.len(),
            completions: self.state.completions.len(),
            payouts: self.state.payouts.len(),
        }
    }

    pub fn into_action(self, _confirmation: ReplaceConfirmation) -> Action {
        Action::ReplaceAll(Box::new(self.state))
    }
}

pub fn backup_filename(date: chrono::NaiveDate) -> String {
    format!("chore_tracker_backup_{}.json", date.format("%Y%m%d"))
}

pub fn export_backup(state: &AppState) -> Result<BackupExport, serde_json::Error> {
    let content = serde_json::to_vec_pretty(state)?;
    let filename = backup_filename(calendar::today());
    info!(
        "📄 EXPORT: Serialized {} kids, {} chores, {} completions ({} bytes)",
        state.kids.len(),
        state.chores.len(),
        state.completions.len(),
        content.len()
    );
    Ok(BackupExport { filename, content })
}

/// Write a backup into `directory` and return the file's path
pub fn export_to_path(state: &AppState, directory: &Path) -> anyhow::Result<PathBuf> {
    let export = export_backup(state)?;
    if !directory.exists() {
        fs::create_dir_all(directory)?;
    }
    let path = directory.join(&export.filename);
    fs::write(&path, &export.content)?;
    info!("✅ EXPORT: Wrote backup to {}", path.display());
    Ok(path)
}

pub fn parse_backup(bytes: &[u8]) -> Result<PendingImport, ImportError> {
    match serde_json::from_slice::<AppState>(bytes) {
        Ok(state) => {
            info!(
                "Parsed backup: schema v{}, {} kids, {} chores",
                state.schema_version,
                state.kids.len(),
                state.chores.len()
            );
            Ok(PendingImport { state })
        }
        Err(e) => {
            error!("❌ IMPORT: Backup could not be parsed: {}", e);
            Err(ImportError::Parse(e))
        }
    }
}

pub fn read_backup(path: &Path) -> Result<PendingImport, ImportError> {
    let bytes = fs::read(path)?;
    parse_backup(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::kid::{AddKidCommand, AdjustPointsCommand};
    use crate::domain::reducer::reduce;
    use tempfile::TempDir;

    fn sample_state() -> AppState {
        let state = reduce(&AppState::default(), Action::AddKid(AddKidCommand::new("Ada")))
            .unwrap();
        let kid_id = state.kids[0].id.clone();
        reduce(&state, Action::AdjustPoints(AdjustPointsCommand::new(kid_id, 12, "Raked leaves")))
            .unwrap()
    }

    #[test]
    fn test_export_is_pretty_json_that_round_trips() {
        let state = sample_state();
        let export = export_backup(&state).unwrap();

        let text = String::from_utf8(export.content.clone()).unwrap();
        assert!(text.contains("\n  \"schema_version\": 3"));
        assert_eq!(export.filename, backup_filename(calendar::today()));

        let pending = parse_backup(&export.content).unwrap();
        assert_eq!(pending.summary().kids, 1);
        let action = pending.into_action(ReplaceConfirmation::destructive_overwrite_confirmed());
        let restored = reduce(&AppState::default(), action).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_malformed_backup_leaves_state_untouched() {
        let state = sample_state();
        let before = serde_json::to_vec(&state).unwrap();

        let result = parse_backup(b"{ this is not json");
        assert!(matches!(result, Err(ImportError::Parse(_))));

        let result = parse_backup(br#"{"kids": "not a list"}"#);
        assert!(matches!(result, Err(ImportError::Parse(_))));

        assert_eq!(serde_json::to_vec(&state).unwrap(), before);
    }

    #[test]
    fn test_old_backup_gets_backfilled_on_import() {
        let old = br#"{
            "schema_version": 2,
            "kids": [{"id": "kid::1", "name": "Ada", "points": 4}],
            "chores": [],
            "rewards": [],
            "completions": [],
            "payouts": [],
            "settings": {"dollars_per_point": 0.25, "hide_completed_on_board": false}
        }"#;
        let pending = parse_backup(old).unwrap();
        assert_eq!(pending.summary().schema_version, 2);

        let action = pending.into_action(ReplaceConfirmation::destructive_overwrite_confirmed());
        let state = reduce(&sample_state(), action).unwrap();
        assert_eq!(state.schema_version, 3);
        assert!(state.adjustments.is_empty());
        assert!(state.streak_bonuses.is_empty());
        assert_eq!(state.settings.dollars_per_point, 0.25);
    }

    #[test]
    fn test_export_to_path_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let state = sample_state();

        let path = export_to_path(&state, &temp_dir.path().join("backups")).unwrap();
        assert!(path.exists());

        let pending = read_backup(&path).unwrap();
        assert_eq!(pending.summary().kids, 1);

        let missing = read_backup(&temp_dir.path().join("nope.json"));
        assert!(matches!(missing, Err(ImportError::Io(_))));
    }

    #[test]
    fn test_backup_filename() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(backup_filename(date), "chore_tracker_backup_20261019.json");
    }
}
