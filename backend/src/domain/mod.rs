//! # Domain Module
//!
//! All business logic for the chore tracker. Everything here is pure: it takes
//! an [`shared::AppState`] by reference and returns values, leaving storage and
//! presentation to other layers.
//!
//! ## Module Organization
//!
//! - **calendar**: Date arithmetic and the "is this chore due" predicate
//! - **streak_engine**: Completion toggling, chore streaks, milestone bonuses
//! - **commands**: The closed set of actions and their command structs
//! - **reducer**: Applies an action to a state, producing the next state
//! - **report_service**: Windowed net-point summaries that feed payouts
//! - **board**: Read-only board and month views
//! - **export_service**: Backup export and confirmed import
//! - **errors**: `NotFound` and validation failures

pub mod board;
pub mod calendar;
pub mod commands;
pub mod errors;
pub mod export_service;
pub mod reducer;
pub mod report_service;
pub mod streak_engine;

pub use board::{board_for, month_progress, BoardItem, DayProgress, MonthProgress};
pub use calendar::DateRange;
pub use commands::Action;
pub use errors::{DomainError, DomainResult, ValidationError};
pub use export_service::{ImportError, PendingImport, ReplaceConfirmation};
pub use reducer::reduce;
pub use report_service::{summarize, ReportPeriod, ReportRow};
pub use streak_engine::toggle_completion;
