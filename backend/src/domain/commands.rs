//! Domain-level command types.
//!
//! Every state transition the reducer understands is one variant of
//! [`Action`], carrying a command struct. Ids and timestamps are generated
//! when a command is built (via the `new` constructors), never inside the
//! reducer, so that applying the same action to the same state always yields
//! the same result.

use chrono::{DateTime, NaiveDate, Utc};
use shared::{AppState, Schedule};

/// Closed set of state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddKid(kid::AddKidCommand),
    UpdateKid(kid::UpdateKidCommand),
    DeleteKid(kid::DeleteKidCommand),
    AdjustPoints(kid::AdjustPointsCommand),
    UpdateSettings(settings::UpdateSettingsCommand),
    AddChore(chore::AddChoreCommand),
    DeleteChore(chore::DeleteChoreCommand),
    ReorderChores(chore::ReorderChoresCommand),
    ToggleCompletion(chore::ToggleCompletionCommand),
    AddReward(reward::AddRewardCommand),
    DeleteReward(reward::DeleteRewardCommand),
    RedeemReward(reward::RedeemRewardCommand),
    RecordPayout(payout::RecordPayoutCommand),
    ResetAll,
    /// Destructive overwrite with an externally supplied state. Build it
    /// through `export_service::PendingImport::into_action`, which demands an
    /// explicit confirmation.
    ReplaceAll(Box<AppState>),
}

impl Action {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddKid(_) => "add_kid",
            Action::UpdateKid(_) => "update_kid",
            Action::DeleteKid(_) => "delete_kid",
            Action::AdjustPoints(_) => "adjust_points",
            Action::UpdateSettings(_) => "update_settings",
            Action::AddChore(_) => "add_chore",
            Action::DeleteChore(_) => "delete_chore",
            Action::ReorderChores(_) => "reorder_chores",
            Action::ToggleCompletion(_) => "toggle_completion",
            Action::AddReward(_) => "add_reward",
            Action::DeleteReward(_) => "delete_reward",
            Action::RedeemReward(_) => "redeem_reward",
            Action::RecordPayout(_) => "record_payout",
            Action::ResetAll => "reset_all",
            Action::ReplaceAll(_) => "replace_all",
        }
    }
}

pub mod kid {
    use super::*;
    use shared::{Adjustment, Kid};

    #[derive(Debug, Clone, PartialEq)]
    pub struct AddKidCommand {
        pub id: String,
        pub name: String,
        /// Picked from the palette when absent
        pub color: Option<String>,
        pub avatar: Option<String>,
    }

    impl AddKidCommand {
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                id: Kid::generate_id(),
                name: name.into(),
                color: None,
                avatar: None,
            }
        }

        pub fn with_color(mut self, color: impl Into<String>) -> Self {
            self.color = Some(color.into());
            self
        }

        pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
            self.avatar = Some(avatar.into());
            self
        }
    }

    /// Partial update; `None` leaves a field as it is
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct UpdateKidCommand {
        pub kid_id: String,
        pub name: Option<String>,
        pub color: Option<String>,
        pub avatar: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DeleteKidCommand {
        pub kid_id: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct AdjustPointsCommand {
        pub id: String,
        pub kid_id: String,
        pub delta: i64,
        /// Blank reasons are replaced with a default
        pub reason: String,
        pub created_at: DateTime<Utc>,
    }

    impl AdjustPointsCommand {
        pub fn new(kid_id: impl Into<String>, delta: i64, reason: impl Into<String>) -> Self {
            Self {
                id: Adjustment::generate_id(),
                kid_id: kid_id.into(),
                delta,
                reason: reason.into(),
                created_at: Utc::now(),
            }
        }
    }
}

pub mod settings {
    /// Partial update; `None` leaves a setting as it is
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct UpdateSettingsCommand {
        pub dollars_per_point: Option<f64>,
        pub hide_completed_on_board: Option<bool>,
    }
}

pub mod chore {
    use super::*;
    use shared::Chore;

    #[derive(Debug, Clone, PartialEq)]
    pub struct AddChoreCommand {
        pub id: String,
        pub title: String,
        pub points: u32,
        pub schedule: Schedule,
        pub assigned_kid_ids: Vec<String>,
    }

    impl AddChoreCommand {
        pub fn new(
            title: impl Into<String>,
            points: u32,
            schedule: Schedule,
            assigned_kid_ids: Vec<String>,
        ) -> Self {
            Self {
                id: Chore::generate_id(),
                title: title.into(),
                points,
                schedule,
                assigned_kid_ids,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DeleteChoreCommand {
        pub chore_id: String,
    }

    /// New display sequence. Chores left out sort last.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ReorderChoresCommand {
        pub chore_ids: Vec<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ToggleCompletionCommand {
        pub kid_id: String,
        pub chore_id: String,
        pub date: NaiveDate,
    }
}

pub mod reward {
    use shared::Reward;

    #[derive(Debug, Clone, PartialEq)]
    pub struct AddRewardCommand {
        pub id: String,
        pub title: String,
        pub cost: u32,
    }

    impl AddRewardCommand {
        pub fn new(title: impl Into<String>, cost: u32) -> Self {
            Self {
                id: Reward::generate_id(),
                title: title.into(),
                cost,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DeleteRewardCommand {
        pub reward_id: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RedeemRewardCommand {
        pub kid_id: String,
        pub reward_id: String,
    }
}

pub mod payout {
    use super::*;
    use shared::Payout;

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordPayoutCommand {
        pub id: String,
        pub kid_id: String,
        pub period_label: String,
        pub start: NaiveDate,
        pub end: NaiveDate,
        pub points: i64,
        pub created_at: DateTime<Utc>,
    }

    impl RecordPayoutCommand {
        pub fn new(
            kid_id: impl Into<String>,
            period_label: impl Into<String>,
            start: NaiveDate,
            end: NaiveDate,
            points: i64,
        ) -> Self {
            Self {
                id: Payout::generate_id(),
                kid_id: kid_id.into(),
                period_label: period_label.into(),
                start,
                end,
                points,
                created_at: Utc::now(),
            }
        }
    }
}
