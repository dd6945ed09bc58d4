//! The single authoritative state reducer.
//!
//! `reduce` turns the current state and one [`Action`] into the next state.
//! It never mutates its input: each transition works on a clone and hands it
//! back, or returns an error and leaves the caller holding the old state.
//! Persistence is the caller's job.
//!
//! ## Business Rules
//!
//! - Balances never go below zero
//! - Manual adjustments always leave an audit entry; chore toggles never do
//! - Deleting a kid removes everything that references the kid except payouts,
//!   which stay as history
//! - Deletions and adjustments of unknown ids are no-ops; lookups needed for
//!   points math or record creation fail with `NotFound`

use log::{info, warn};
use shared::{
    Adjustment, AppState, Chore, Kid, Payout, Reward, Schedule, CURRENT_SCHEMA_VERSION,
};

use super::commands::chore::{AddChoreCommand, ReorderChoresCommand};
use super::commands::kid::{AddKidCommand, AdjustPointsCommand, UpdateKidCommand};
use super::commands::payout::RecordPayoutCommand;
use super::commands::reward::{AddRewardCommand, RedeemRewardCommand};
use super::commands::settings::UpdateSettingsCommand;
use super::commands::Action;
use super::errors::{DomainError, DomainResult, ValidationError};
use super::streak_engine::{apply_delta, toggle_completion};

/// Colors handed out to new kids in rotation
pub const KID_COLOR_PALETTE: [&str; 8] = [
    "#f97316", "#0ea5e9", "#22c55e", "#a855f7", "#ef4444", "#eab308", "#14b8a6", "#ec4899",
];

/// Order given to chores left out of a reorder request
pub const REORDER_FALLBACK_ORDER: i64 = 9999;

pub const DEFAULT_ADJUSTMENT_REASON: &str = "Manual adjustment";

const MAX_NAME_LENGTH: usize = 100;

pub fn reduce(state: &AppState, action: Action) -> DomainResult<AppState> {
    match action {
        Action::AddKid(command) => add_kid(state, command),
        Action::UpdateKid(command) => update_kid(state, command),
        Action::DeleteKid(command) => Ok(delete_kid(state, &command.kid_id)),
        Action::AdjustPoints(command) => Ok(adjust_points(state, command)),
        Action::UpdateSettings(command) => update_settings(state, command),
        Action::AddChore(command) => add_chore(state, command),
        Action::DeleteChore(command) => Ok(delete_chore(state, &command.chore_id)),
        Action::ReorderChores(command) => Ok(reorder_chores(state, command)),
        Action::ToggleCompletion(command) => {
            toggle_completion(state, &command.kid_id, &command.chore_id, command.date)
        }
        Action::AddReward(command) => add_reward(state, command),
        Action::DeleteReward(command) => {
            let mut next = state.clone();
            next.rewards.retain(|r| r.id != command.reward_id);
            Ok(next)
        }
        Action::RedeemReward(command) => Ok(redeem_reward(state, command)),
        Action::RecordPayout(command) => record_payout(state, command),
        Action::ResetAll => {
            info!("Resetting all data to defaults");
            Ok(AppState::default())
        }
        Action::ReplaceAll(replacement) => Ok(replace_all(*replacement)),
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong(MAX_NAME_LENGTH));
    }
    Ok(())
}

/// Drop blank strings so an empty color or avatar means "none"
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn add_kid(state: &AppState, command: AddKidCommand) -> DomainResult<AppState> {
    validate_name(&command.name)?;

    let color = non_blank(command.color).unwrap_or_else(|| {
        KID_COLOR_PALETTE[state.kids.len() % KID_COLOR_PALETTE.len()].to_string()
    });

    let kid = Kid {
        id: command.id,
        name: command.name.trim().to_string(),
        color: Some(color),
        avatar: non_blank(command.avatar),
        points: 0,
    };
    info!("Adding kid: {} with ID: {}", kid.name, kid.id);

    let mut next = state.clone();
    next.kids.push(kid);
    Ok(next)
}

fn update_kid(state: &AppState, command: UpdateKidCommand) -> DomainResult<AppState> {
    if let Some(ref name) = command.name {
        validate_name(name)?;
    }

    let mut next = state.clone();
    let kid = next
        .kids
        .iter_mut()
        .find(|k| k.id == command.kid_id)
        .ok_or_else(|| DomainError::kid_not_found(&command.kid_id))?;

    if let Some(name) = command.name {
        kid.name = name.trim().to_string();
    }
    if command.color.is_some() {
        kid.color = non_blank(command.color);
    }
    if command.avatar.is_some() {
        kid.avatar = non_blank(command.avatar);
    }
    Ok(next)
}

fn delete_kid(state: &AppState, kid_id: &str) -> AppState {
    let mut next = state.clone();
    let before = next.kids.len();
    next.kids.retain(|k| k.id != kid_id);
    if next.kids.len() == before {
        return next;
    }

    next.completions.retain(|c| c.kid_id != kid_id);
    next.adjustments.retain(|a| a.kid_id != kid_id);
    next.streak_bonuses.retain(|b| b.kid_id != kid_id);
    for chore in next.chores.iter_mut() {
        chore.assigned_kid_ids.retain(|id| id != kid_id);
        chore.streaks.remove(kid_id);
    }
    info!("Deleted kid {} and everything referencing it", kid_id);
    next
}

fn adjust_points(state: &AppState, command: AdjustPointsCommand) -> AppState {
    if state.kid(&command.kid_id).is_none() {
        warn!("Ignoring point adjustment for unknown kid: {}", command.kid_id);
        return state.clone();
    }

    let mut next = state.clone();
    if let Some(kid) = next.kids.iter_mut().find(|k| k.id == command.kid_id) {
        kid.points = apply_delta(kid.points, command.delta);
    }

    let reason = if command.reason.trim().is_empty() {
        DEFAULT_ADJUSTMENT_REASON.to_string()
    } else {
        command.reason.trim().to_string()
    };
    info!("Adjusting kid {} by {} points: {}", command.kid_id, command.delta, reason);

    next.adjustments.push(Adjustment {
        id: command.id,
        kid_id: command.kid_id,
        delta: command.delta,
        reason,
        created_at: command.created_at,
    });
    next
}

fn update_settings(state: &AppState, command: UpdateSettingsCommand) -> DomainResult<AppState> {
    if let Some(rate) = command.dollars_per_point {
        if !rate.is_finite() || rate < 0.0 {
            return Err(ValidationError::InvalidRate.into());
        }
    }

    let mut next = state.clone();
    if let Some(rate) = command.dollars_per_point {
        next.settings.dollars_per_point = rate;
    }
    if let Some(hide) = command.hide_completed_on_board {
        next.settings.hide_completed_on_board = hide;
    }
    Ok(next)
}

fn validate_schedule(schedule: &Schedule) -> Result<(), ValidationError> {
    match schedule {
        Schedule::Daily => Ok(()),
        Schedule::Weekly { days_of_week } => {
            if days_of_week.is_empty() {
                return Err(ValidationError::EmptySchedule);
            }
            match days_of_week.iter().find(|d| !Schedule::is_valid_day_of_week(**d)) {
                Some(day) => Err(ValidationError::InvalidWeekday(*day)),
                None => Ok(()),
            }
        }
        Schedule::Custom { dates } => {
            if dates.is_empty() {
                Err(ValidationError::EmptySchedule)
            } else {
                Ok(())
            }
        }
    }
}

fn add_chore(state: &AppState, command: AddChoreCommand) -> DomainResult<AppState> {
    if command.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    if command.points == 0 {
        return Err(ValidationError::NonPositivePoints.into());
    }
    if command.assigned_kid_ids.is_empty() {
        return Err(ValidationError::NoAssignedKids.into());
    }
    validate_schedule(&command.schedule)?;
    if let Some(missing) = command.assigned_kid_ids.iter().find(|id| state.kid(id).is_none()) {
        return Err(DomainError::kid_not_found(missing));
    }

    let mut assigned_kid_ids = Vec::with_capacity(command.assigned_kid_ids.len());
    for id in command.assigned_kid_ids {
        if !assigned_kid_ids.contains(&id) {
            assigned_kid_ids.push(id);
        }
    }

    let order = state.chores.iter().map(|c| c.order).max().unwrap_or(0) + 1;
    let chore = Chore {
        id: command.id,
        title: command.title.trim().to_string(),
        points: command.points,
        schedule: command.schedule,
        assigned_kid_ids,
        streaks: Default::default(),
        order,
    };
    info!("Adding chore: {} ({} pts) at order {}", chore.title, chore.points, order);

    let mut next = state.clone();
    next.chores.push(chore);
    Ok(next)
}

fn delete_chore(state: &AppState, chore_id: &str) -> AppState {
    let mut next = state.clone();
    next.chores.retain(|c| c.id != chore_id);
    next.completions.retain(|c| c.chore_id != chore_id);
    next
}

fn reorder_chores(state: &AppState, command: ReorderChoresCommand) -> AppState {
    let mut next = state.clone();
    for chore in next.chores.iter_mut() {
        chore.order = command
            .chore_ids
            .iter()
            .position(|id| *id == chore.id)
            .map(|index| index as i64 + 1)
            .unwrap_or(REORDER_FALLBACK_ORDER);
    }
    next
}

fn add_reward(state: &AppState, command: AddRewardCommand) -> DomainResult<AppState> {
    if command.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle.into());
    }
    if command.cost == 0 {
        return Err(ValidationError::NonPositiveCost.into());
    }

    let mut next = state.clone();
    next.rewards.push(Reward {
        id: command.id,
        title: command.title.trim().to_string(),
        cost: command.cost,
    });
    Ok(next)
}

/// Redemption has no agreed semantics yet, so the state comes back unchanged.
fn redeem_reward(state: &AppState, command: RedeemRewardCommand) -> AppState {
    warn!(
        "Reward redemption is not yet supported (kid {}, reward {}); state unchanged",
        command.kid_id, command.reward_id
    );
    state.clone()
}

/// Round a dollar amount to whole cents
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn record_payout(state: &AppState, command: RecordPayoutCommand) -> DomainResult<AppState> {
    if state.kid(&command.kid_id).is_none() {
        return Err(DomainError::kid_not_found(&command.kid_id));
    }
    if command.start > command.end {
        return Err(ValidationError::InvalidDateRange {
            start: command.start.to_string(),
            end: command.end.to_string(),
        }
        .into());
    }

    let dollars = round_to_cents(command.points as f64 * state.settings.dollars_per_point);
    info!(
        "Recording payout for kid {}: {} points = ${:.2} ({})",
        command.kid_id, command.points, dollars, command.period_label
    );

    let mut next = state.clone();
    next.payouts.insert(
        0,
        Payout {
            id: command.id,
            kid_id: command.kid_id,
            period_label: command.period_label,
            start: command.start,
            end: command.end,
            points: command.points,
            dollars,
            created_at: command.created_at,
        },
    );
    Ok(next)
}

fn replace_all(replacement: AppState) -> AppState {
    let mut next = replacement.normalized();
    if next.schema_version < CURRENT_SCHEMA_VERSION {
        info!(
            "Upgrading replaced state from schema v{} to v{}",
            next.schema_version, CURRENT_SCHEMA_VERSION
        );
        next.schema_version = CURRENT_SCHEMA_VERSION;
    }
    info!(
        "Replaced all data: {} kids, {} chores, {} completions",
        next.kids.len(),
        next.chores.len(),
        next.completions.len()
    );
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::chore::{DeleteChoreCommand, ToggleCompletionCommand};
    use crate::domain::commands::kid::DeleteKidCommand;
    use crate::domain::commands::reward::DeleteRewardCommand;
    use chrono::{Duration, NaiveDate};
    use shared::Completion;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn add_kid_named(state: &AppState, id: &str, name: &str) -> AppState {
        let command = AddKidCommand {
            id: id.to_string(),
            name: name.to_string(),
            color: None,
            avatar: None,
        };
        reduce(state, Action::AddKid(command)).expect("Failed to add kid")
    }

    fn add_daily_chore(state: &AppState, id: &str, points: u32, kids: &[&str]) -> AppState {
        let command = AddChoreCommand {
            id: id.to_string(),
            title: id.to_string(),
            points,
            schedule: Schedule::Daily,
            assigned_kid_ids: kids.iter().map(|k| k.to_string()).collect(),
        };
        reduce(state, Action::AddChore(command)).expect("Failed to add chore")
    }

    fn toggle(state: &AppState, kid_id: &str, chore_id: &str, date: NaiveDate) -> AppState {
        let command = ToggleCompletionCommand {
            kid_id: kid_id.to_string(),
            chore_id: chore_id.to_string(),
            date,
        };
        reduce(state, Action::ToggleCompletion(command)).expect("Failed to toggle")
    }

    fn adjust(state: &AppState, kid_id: &str, delta: i64, reason: &str) -> AppState {
        reduce(state, Action::AdjustPoints(AdjustPointsCommand::new(kid_id, delta, reason)))
            .expect("Adjustments never fail")
    }

    #[test]
    fn test_add_kid() {
        let state = add_kid_named(&AppState::default(), "kid::a", "  Ada  ");
        let kid = state.kid("kid::a").unwrap();
        assert_eq!(kid.name, "Ada");
        assert_eq!(kid.points, 0);
        assert_eq!(kid.color.as_deref(), Some(KID_COLOR_PALETTE[0]));
    }

    #[test]
    fn test_add_kid_rotates_palette_and_keeps_explicit_color() {
        let mut state = AppState::default();
        for i in 0..KID_COLOR_PALETTE.len() + 1 {
            state = add_kid_named(&state, &format!("kid::{}", i), "Kid");
        }
        assert_eq!(state.kids[1].color.as_deref(), Some(KID_COLOR_PALETTE[1]));
        assert_eq!(state.kids[8].color.as_deref(), Some(KID_COLOR_PALETTE[0]));

        let command = AddKidCommand::new("Bo").with_color("#000000").with_avatar("🦊");
        let state = reduce(&state, Action::AddKid(command)).unwrap();
        let bo = state.kids.last().unwrap();
        assert_eq!(bo.color.as_deref(), Some("#000000"));
        assert_eq!(bo.avatar.as_deref(), Some("🦊"));
    }

    #[test]
    fn test_add_kid_validation() {
        let state = AppState::default();
        let result = reduce(&state, Action::AddKid(AddKidCommand::new("   ")));
        assert_eq!(result, Err(DomainError::Validation(ValidationError::EmptyName)));

        let result = reduce(&state, Action::AddKid(AddKidCommand::new("x".repeat(101))));
        assert_eq!(result, Err(DomainError::Validation(ValidationError::NameTooLong(100))));
    }

    #[test]
    fn test_update_kid() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let command = UpdateKidCommand {
            kid_id: "kid::a".to_string(),
            name: Some("Ada L.".to_string()),
            avatar: Some("🐢".to_string()),
            ..Default::default()
        };
        let state = reduce(&state, Action::UpdateKid(command)).unwrap();
        let kid = state.kid("kid::a").unwrap();
        assert_eq!(kid.name, "Ada L.");
        assert_eq!(kid.avatar.as_deref(), Some("🐢"));
        assert_eq!(kid.color.as_deref(), Some(KID_COLOR_PALETTE[0]));

        let missing = UpdateKidCommand { kid_id: "kid::nope".to_string(), ..Default::default() };
        assert!(matches!(
            reduce(&state, Action::UpdateKid(missing)),
            Err(DomainError::NotFound { .. })
        ));
    }

    #[test]
    fn test_adjust_points_clamps_and_audits() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = adjust(&state, "kid::a", 10, "Helped grandma");
        let state = adjust(&state, "kid::a", -25, "");

        assert_eq!(state.kid("kid::a").unwrap().points, 0);
        assert_eq!(state.adjustments.len(), 2);
        assert_eq!(state.adjustments[0].reason, "Helped grandma");
        assert_eq!(state.adjustments[1].delta, -25);
        assert_eq!(state.adjustments[1].reason, DEFAULT_ADJUSTMENT_REASON);
    }

    #[test]
    fn test_adjust_points_with_extreme_deltas() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = adjust(&state, "kid::a", 3, "Start");

        let credited = adjust(&state, "kid::a", i64::MAX, "Lottery");
        assert_eq!(credited.kid("kid::a").unwrap().points, u32::MAX);
        assert_eq!(credited.adjustments[1].delta, i64::MAX);

        let debited = adjust(&state, "kid::a", i64::MIN, "Everything");
        assert_eq!(debited.kid("kid::a").unwrap().points, 0);
    }

    #[test]
    fn test_adjust_unknown_kid_is_noop() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let next = adjust(&state, "kid::missing", 10, "typo");
        assert_eq!(next, state);
    }

    #[test]
    fn test_update_settings_partial() {
        let state = AppState::default();
        let command = UpdateSettingsCommand {
            dollars_per_point: Some(0.25),
            hide_completed_on_board: None,
        };
        let state = reduce(&state, Action::UpdateSettings(command)).unwrap();
        assert_eq!(state.settings.dollars_per_point, 0.25);
        assert!(state.settings.hide_completed_on_board);

        let command = UpdateSettingsCommand {
            dollars_per_point: None,
            hide_completed_on_board: Some(false),
        };
        let state = reduce(&state, Action::UpdateSettings(command)).unwrap();
        assert_eq!(state.settings.dollars_per_point, 0.25);
        assert!(!state.settings.hide_completed_on_board);

        let bad = UpdateSettingsCommand { dollars_per_point: Some(-1.0), ..Default::default() };
        assert_eq!(
            reduce(&state, Action::UpdateSettings(bad)),
            Err(DomainError::Validation(ValidationError::InvalidRate))
        );
    }

    #[test]
    fn test_add_chore_assigns_next_order() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = add_daily_chore(&state, "chore::1", 2, &["kid::a"]);
        let state = add_daily_chore(&state, "chore::2", 2, &["kid::a"]);
        assert_eq!(state.chore("chore::1").unwrap().order, 1);
        assert_eq!(state.chore("chore::2").unwrap().order, 2);
        assert!(state.chore("chore::2").unwrap().streaks.is_empty());
    }

    #[test]
    fn test_add_chore_validation() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let kids = vec!["kid::a".to_string()];

        let cases = vec![
            (AddChoreCommand::new(" ", 1, Schedule::Daily, kids.clone()), ValidationError::EmptyTitle),
            (AddChoreCommand::new("Dishes", 0, Schedule::Daily, kids.clone()), ValidationError::NonPositivePoints),
            (AddChoreCommand::new("Dishes", 1, Schedule::Daily, vec![]), ValidationError::NoAssignedKids),
            (
                AddChoreCommand::new(
                    "Dishes",
                    1,
                    Schedule::Weekly { days_of_week: [7].into_iter().collect() },
                    kids.clone(),
                ),
                ValidationError::InvalidWeekday(7),
            ),
            (
                AddChoreCommand::new(
                    "Dishes",
                    1,
                    Schedule::Custom { dates: Default::default() },
                    kids.clone(),
                ),
                ValidationError::EmptySchedule,
            ),
        ];

        for (command, expected) in cases {
            assert_eq!(
                reduce(&state, Action::AddChore(command)),
                Err(DomainError::Validation(expected))
            );
        }

        let unknown = AddChoreCommand::new("Dishes", 1, Schedule::Daily, vec!["kid::zzz".to_string()]);
        assert_eq!(
            reduce(&state, Action::AddChore(unknown)),
            Err(DomainError::kid_not_found("kid::zzz"))
        );
    }

    #[test]
    fn test_delete_chore_cascades_completions() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = add_daily_chore(&state, "chore::1", 2, &["kid::a"]);
        let state = add_daily_chore(&state, "chore::2", 2, &["kid::a"]);
        let state = toggle(&state, "kid::a", "chore::1", date(2026, 1, 1));
        let state = toggle(&state, "kid::a", "chore::2", date(2026, 1, 1));

        let command = DeleteChoreCommand { chore_id: "chore::1".to_string() };
        let state = reduce(&state, Action::DeleteChore(command.clone())).unwrap();
        assert!(state.chore("chore::1").is_none());
        assert_eq!(state.completions.len(), 1);
        assert_eq!(state.completions[0].chore_id, "chore::2");

        // Deleting again is a no-op
        let again = reduce(&state, Action::DeleteChore(command)).unwrap();
        assert_eq!(again, state);
    }

    #[test]
    fn test_delete_kid_cascades() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = add_kid_named(&state, "kid::b", "Bo");
        let state = add_daily_chore(&state, "chore::1", 2, &["kid::a", "kid::b"]);
        let state = toggle(&state, "kid::a", "chore::1", date(2026, 1, 1));
        let state = toggle(&state, "kid::b", "chore::1", date(2026, 1, 1));
        let state = adjust(&state, "kid::a", 5, "bonus");
        let state = adjust(&state, "kid::b", 5, "bonus");

        let command = DeleteKidCommand { kid_id: "kid::a".to_string() };
        let state = reduce(&state, Action::DeleteKid(command.clone())).unwrap();

        assert!(state.kid("kid::a").is_none());
        assert!(state.completions.iter().all(|c| c.kid_id != "kid::a"));
        assert!(state.adjustments.iter().all(|a| a.kid_id != "kid::a"));
        assert_eq!(state.completions.len(), 1);
        assert_eq!(state.adjustments.len(), 1);
        let chore = state.chore("chore::1").unwrap();
        assert_eq!(chore.assigned_kid_ids, vec!["kid::b".to_string()]);
        assert!(!chore.streaks.contains_key("kid::a"));

        let again = reduce(&state, Action::DeleteKid(command)).unwrap();
        assert_eq!(again, state);
    }

    #[test]
    fn test_reorder_chores() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = add_daily_chore(&state, "A", 1, &["kid::a"]);
        let state = add_daily_chore(&state, "B", 1, &["kid::a"]);
        let state = add_daily_chore(&state, "C", 1, &["kid::a"]);

        let command = ReorderChoresCommand {
            chore_ids: vec!["C".to_string(), "A".to_string(), "B".to_string()],
        };
        let state = reduce(&state, Action::ReorderChores(command)).unwrap();
        let ids: Vec<&str> = state.sorted_chores().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_reorder_unlisted_chores_sort_last() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = add_daily_chore(&state, "A", 1, &["kid::a"]);
        let state = add_daily_chore(&state, "B", 1, &["kid::a"]);
        let state = add_daily_chore(&state, "C", 1, &["kid::a"]);

        let command = ReorderChoresCommand { chore_ids: vec!["B".to_string()] };
        let state = reduce(&state, Action::ReorderChores(command)).unwrap();
        assert_eq!(state.chore("B").unwrap().order, 1);
        assert_eq!(state.chore("A").unwrap().order, REORDER_FALLBACK_ORDER);
        assert_eq!(state.sorted_chores()[0].id, "B");

        // New chores still land after everything
        let state = add_daily_chore(&state, "D", 1, &["kid::a"]);
        assert_eq!(state.chore("D").unwrap().order, REORDER_FALLBACK_ORDER + 1);
    }

    #[test]
    fn test_toggle_unknown_chore_fails_and_keeps_state() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let command = ToggleCompletionCommand {
            kid_id: "kid::a".to_string(),
            chore_id: "chore::nope".to_string(),
            date: date(2026, 1, 1),
        };
        assert_eq!(
            reduce(&state, Action::ToggleCompletion(command)),
            Err(DomainError::chore_not_found("chore::nope"))
        );
    }

    #[test]
    fn test_toggle_twice_round_trips() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = add_daily_chore(&state, "chore::1", 4, &["kid::a"]);
        let state = toggle(&state, "kid::a", "chore::1", date(2026, 1, 1));

        let once = toggle(&state, "kid::a", "chore::1", date(2026, 1, 2));
        let twice = toggle(&once, "kid::a", "chore::1", date(2026, 1, 2));
        assert_ne!(once, state);
        assert_eq!(twice.kids, state.kids);
        assert_eq!(twice.completions, state.completions);
        assert_eq!(twice.streak_bonuses, state.streak_bonuses);
    }

    #[test]
    fn test_rewards_catalog_and_redeem_noop() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = adjust(&state, "kid::a", 50, "seed");
        let command = AddRewardCommand {
            id: "reward::1".to_string(),
            title: "Movie night".to_string(),
            cost: 30,
        };
        let state = reduce(&state, Action::AddReward(command)).unwrap();
        assert_eq!(state.reward("reward::1").unwrap().cost, 30);

        let redeem = RedeemRewardCommand {
            kid_id: "kid::a".to_string(),
            reward_id: "reward::1".to_string(),
        };
        let after = reduce(&state, Action::RedeemReward(redeem)).unwrap();
        assert_eq!(after, state);

        let bad = AddRewardCommand::new("Free", 0);
        assert_eq!(
            reduce(&state, Action::AddReward(bad)),
            Err(DomainError::Validation(ValidationError::NonPositiveCost))
        );

        let delete = DeleteRewardCommand { reward_id: "reward::1".to_string() };
        let state = reduce(&state, Action::DeleteReward(delete)).unwrap();
        assert!(state.rewards.is_empty());
    }

    #[test]
    fn test_record_payout_keeps_balance() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = adjust(&state, "kid::a", 80, "seed");

        let command = RecordPayoutCommand::new(
            "kid::a",
            "October 2026",
            date(2026, 10, 1),
            date(2026, 10, 31),
            50,
        );
        let state = reduce(&state, Action::RecordPayout(command)).unwrap();

        assert_eq!(state.kid("kid::a").unwrap().points, 80);
        assert_eq!(state.payouts.len(), 1);
        assert_eq!(state.payouts[0].dollars, round_to_cents(50.0 * 0.1));
        assert_eq!(state.payouts[0].dollars, 5.0);

        // Newest payout goes first
        let second = RecordPayoutCommand::new(
            "kid::a",
            "November 2026",
            date(2026, 11, 1),
            date(2026, 11, 30),
            7,
        );
        let state = reduce(&state, Action::RecordPayout(second)).unwrap();
        assert_eq!(state.payouts[0].period_label, "November 2026");
        assert_eq!(state.payouts[0].dollars, 0.7);
    }

    #[test]
    fn test_record_payout_rounds_to_cents() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let settings = UpdateSettingsCommand {
            dollars_per_point: Some(0.333),
            ..Default::default()
        };
        let state = reduce(&state, Action::UpdateSettings(settings)).unwrap();
        let command =
            RecordPayoutCommand::new("kid::a", "Custom", date(2026, 1, 1), date(2026, 1, 1), 7);
        let state = reduce(&state, Action::RecordPayout(command)).unwrap();
        assert_eq!(state.payouts[0].dollars, 2.33);
    }

    #[test]
    fn test_record_payout_errors() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let unknown =
            RecordPayoutCommand::new("kid::zzz", "x", date(2026, 1, 1), date(2026, 1, 2), 5);
        assert!(matches!(
            reduce(&state, Action::RecordPayout(unknown)),
            Err(DomainError::NotFound { .. })
        ));

        let backwards =
            RecordPayoutCommand::new("kid::a", "x", date(2026, 1, 5), date(2026, 1, 2), 5);
        assert!(matches!(
            reduce(&state, Action::RecordPayout(backwards)),
            Err(DomainError::Validation(ValidationError::InvalidDateRange { .. }))
        ));
    }

    #[test]
    fn test_reset_all() {
        let state = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = reduce(&state, Action::ResetAll).unwrap();
        assert_eq!(state, AppState::default());
        assert_eq!(state.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_replace_all_upgrades_and_normalizes() {
        let mut incoming = AppState::default();
        incoming.schema_version = 2;
        incoming.kids.push(Kid {
            id: "kid::x".to_string(),
            name: "Xi".to_string(),
            color: None,
            avatar: None,
            points: 9,
        });
        let mut chore = Chore {
            id: "chore::x".to_string(),
            title: "Feed cat".to_string(),
            points: 1,
            schedule: Schedule::Daily,
            assigned_kid_ids: vec!["kid::x".to_string(), "kid::gone".to_string()],
            streaks: Default::default(),
            order: 1,
        };
        chore.streaks.insert("kid::x".to_string(), 1);
        chore.streaks.insert("kid::gone".to_string(), 4);
        incoming.chores.push(chore);
        let completion = Completion {
            kid_id: "kid::x".to_string(),
            chore_id: "chore::x".to_string(),
            date: date(2026, 2, 1),
        };
        incoming.completions.push(completion.clone());
        incoming.completions.push(completion);

        let current = add_kid_named(&AppState::default(), "kid::a", "Ada");
        let state = reduce(&current, Action::ReplaceAll(Box::new(incoming))).unwrap();

        assert_eq!(state.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(state.kid("kid::a").is_none());
        assert_eq!(state.kid("kid::x").unwrap().points, 9);
        assert_eq!(state.completions.len(), 1);
        let chore = state.chore("chore::x").unwrap();
        assert_eq!(chore.assigned_kid_ids, vec!["kid::x".to_string()]);
        assert!(!chore.streaks.contains_key("kid::gone"));
    }

    #[test]
    fn test_ten_day_scenario_through_reducer() {
        let state = add_kid_named(&AppState::default(), "kid::k", "Kay");
        let mut state = add_daily_chore(&state, "chore::c", 3, &["kid::k"]);
        let first = date(2026, 5, 1);
        for n in 0..10 {
            state = toggle(&state, "kid::k", "chore::c", first + Duration::days(n));
        }
        assert_eq!(state.kid("kid::k").unwrap().points, 35);
        assert_eq!(state.streak_bonuses.len(), 1);
        assert_eq!(state.streak_bonuses[0].streak_length, 10);
        // Chore points never create adjustments
        assert!(state.adjustments.is_empty());

        let state = toggle(&state, "kid::k", "chore::c", first + Duration::days(9));
        assert_eq!(state.kid("kid::k").unwrap().points, 27);
        assert!(state.streak_bonuses.is_empty());
        assert_eq!(state.chore("chore::c").unwrap().streak_for("kid::k"), 0);
    }
}
