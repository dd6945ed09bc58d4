//! # Chore Tracker Backend
//!
//! Contains all non-UI logic for the chore tracker.
//!
//! ## Architecture
//!
//! ```text
//! CLI (main.rs)
//!     ↓
//! Backend controller (owns the AppState)
//!     ↓                     ↓
//! Domain (pure reducer)   Storage (JSON key-value files)
//! ```
//!
//! ## Key Responsibilities
//!
//! - Load the saved state at startup, falling back to an empty one
//! - Run every action through the reducer and install the result
//! - Save after each successful transition; a failed save is logged, never fatal
//! - Answer read-only queries (board, month view, reports) against the current state

pub mod domain;
pub mod storage;

use anyhow::Result;
use chrono::NaiveDate;
use log::{error, info, warn};
use shared::AppState;
use std::path::{Path, PathBuf};

use crate::domain::commands::Action;
use crate::domain::export_service::{self, ImportError, PendingImport, ReplaceConfirmation};
use crate::domain::report_service::{self, ReportPeriod, ReportRow};
use crate::domain::{board, DomainResult};
use crate::storage::{JsonConnection, StateRepository, StateStorage};

pub use shared;

/// Owns the current state and the storage it is saved to
pub struct Backend<S: StateStorage> {
    state: AppState,
    storage: S,
}

impl Backend<StateRepository<JsonConnection>> {
    /// Open the default data directory (see [`JsonConnection::new_default`])
    pub fn open_default() -> Result<Self> {
        let connection = JsonConnection::new_default()?;
        Ok(Self::new(StateRepository::new(connection)))
    }

    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let connection = JsonConnection::new(data_dir)?;
        Ok(Self::new(StateRepository::new(connection)))
    }
}

impl<S: StateStorage> Backend<S> {
    pub fn new(storage: S) -> Self {
        let state = storage.load();
        info!(
            "Backend ready: {} kids, {} chores, {} rewards",
            state.kids.len(),
            state.chores.len(),
            state.rewards.len()
        );
        Self { state, storage }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply an action. On error the current state is left exactly as it was.
    pub fn dispatch(&mut self, action: Action) -> DomainResult<&AppState> {
        let name = action.name();
        let next = match domain::reduce(&self.state, action) {
            Ok(next) => next,
            Err(e) => {
                warn!("❌ {} rejected: {}", name, e);
                return Err(e);
            }
        };
        self.state = next;
        info!("✅ {} applied", name);

        if let Err(e) = self.storage.save(&self.state) {
            error!("Failed to save state after {}: {}", name, e);
        }
        Ok(&self.state)
    }

    pub fn board(&self, kid_id: &str, date: NaiveDate) -> Vec<board::BoardItem> {
        board::board_for(&self.state, kid_id, date)
    }

    pub fn month(&self, kid_id: &str, year: i32, month: u32) -> board::MonthProgress {
        board::month_progress(&self.state, kid_id, year, month)
    }

    pub fn report(&self, kid_filter: Option<&str>, period: &ReportPeriod) -> Vec<ReportRow> {
        report_service::summarize(&self.state, kid_filter, period.range())
    }

    /// Record a payout of each reported kid's net points for the period.
    /// Kids whose net is zero are skipped. Returns the number of payouts made.
    pub fn pay_out(&mut self, kid_filter: Option<&str>, period: &ReportPeriod) -> DomainResult<usize> {
        let commands: Vec<_> = self
            .report(kid_filter, period)
            .iter()
            .filter(|row| row.net != 0)
            .map(|row| report_service::payout_command_for(row, period))
            .collect();

        let count = commands.len();
        for command in commands {
            self.dispatch(Action::RecordPayout(command))?;
        }
        Ok(count)
    }

    pub fn export_to(&self, directory: &Path) -> Result<PathBuf> {
        export_service::export_to_path(&self.state, directory)
    }

    pub fn preview_import(&self, path: &Path) -> Result<PendingImport, ImportError> {
        export_service::read_backup(path)
    }

    /// Replace everything with a previously parsed backup
    pub fn import(
        &mut self,
        pending: PendingImport,
        confirmation: ReplaceConfirmation,
    ) -> DomainResult<&AppState> {
        self.dispatch(pending.into_action(confirmation))
    }
}
