//! Completion toggling and streak bookkeeping.
//!
//! Toggling a chore for a kid on a date is the one transition with real
//! temporal logic. It flips the completion record, moves the kid's balance by
//! the chore's point value (directly, without an audit entry), recomputes the
//! chore's per-kid streak counter, and then awards or revokes the milestone
//! bonus for that date depending on whether the day is now "full".
//!
//! ## Definitions
//!
//! - **Full day**: every chore due for the kid on the date is completed, and
//!   at least one chore was due.
//! - **Run**: consecutive full days ending at and including a date.
//! - **Milestone**: a run that is a positive multiple of
//!   [`STREAK_MILESTONE_INTERVAL`], worth [`STREAK_BONUS_POINTS`] once per date.
//!
//! Only the toggled date's bonus is evaluated. Later dates keep whatever
//! bonus they already have since their own completion sets did not change.

use chrono::NaiveDate;
use log::{debug, info};
use shared::{
    AppState, Chore, Completion, StreakBonus, STREAK_BONUS_POINTS, STREAK_MILESTONE_INTERVAL,
};
use std::collections::HashSet;

use super::calendar::{is_due_for, yesterday_of};
use super::errors::{DomainError, DomainResult};

/// One kid's completions, indexed for the backward walks
pub struct CompletionIndex<'a> {
    done: HashSet<(&'a str, NaiveDate)>,
}

impl<'a> CompletionIndex<'a> {
    pub fn for_kid(completions: &'a [Completion], kid_id: &str) -> Self {
        let done = completions
            .iter()
            .filter(|c| c.kid_id == kid_id)
            .map(|c| (c.chore_id.as_str(), c.date))
            .collect();
        Self { done }
    }

    pub fn contains(&self, chore_id: &str, date: NaiveDate) -> bool {
        self.done.contains(&(chore_id, date))
    }
}

/// Full-day check against a prebuilt index
pub fn full_day(chores: &[Chore], index: &CompletionIndex<'_>, kid_id: &str, date: NaiveDate) -> bool {
    let mut due = chores.iter().filter(|c| is_due_for(c, kid_id, date)).peekable();
    if due.peek().is_none() {
        return false;
    }
    due.all(|c| index.contains(&c.id, date))
}

/// Count consecutive full days walking backwards from `date` (inclusive).
/// Stops at the first day that is not full, including days with nothing due.
pub fn consecutive_full_days(
    chores: &[Chore],
    index: &CompletionIndex<'_>,
    kid_id: &str,
    date: NaiveDate,
) -> u32 {
    let mut run = 0;
    let mut day = Some(date);
    while let Some(current) = day {
        if !full_day(chores, index, kid_id, current) {
            break;
        }
        run += 1;
        day = current.pred_opt();
    }
    run
}

/// Consecutive days, ending at `date`, on which the kid completed this chore
pub fn chore_run(index: &CompletionIndex<'_>, chore_id: &str, date: NaiveDate) -> u32 {
    let mut run = 0;
    let mut day = Some(date);
    while let Some(current) = day {
        if !index.contains(chore_id, current) {
            break;
        }
        run += 1;
        day = current.pred_opt();
    }
    run
}

pub fn is_full_day(state: &AppState, kid_id: &str, date: NaiveDate) -> bool {
    let index = CompletionIndex::for_kid(&state.completions, kid_id);
    full_day(&state.chores, &index, kid_id, date)
}

pub fn run_length(state: &AppState, kid_id: &str, date: NaiveDate) -> u32 {
    let index = CompletionIndex::for_kid(&state.completions, kid_id);
    consecutive_full_days(&state.chores, &index, kid_id, date)
}

pub fn is_milestone(run: u32) -> bool {
    run > 0 && run % STREAK_MILESTONE_INTERVAL == 0
}

/// Flip the completion of `chore_id` by `kid_id` on `date` and return the
/// resulting state.
///
/// Fails with `NotFound` if the chore or the kid does not exist, since the
/// points math is undefined without them. The input state is never modified.
pub fn toggle_completion(
    state: &AppState,
    kid_id: &str,
    chore_id: &str,
    date: NaiveDate,
) -> DomainResult<AppState> {
    let chore_points = state
        .chore(chore_id)
        .ok_or_else(|| DomainError::chore_not_found(chore_id))?
        .points;
    if state.kid(kid_id).is_none() {
        return Err(DomainError::kid_not_found(kid_id));
    }

    let mut next = state.clone();

    let was_completed = next.is_completed(kid_id, chore_id, date);
    if was_completed {
        next.completions
            .retain(|c| !(c.kid_id == kid_id && c.chore_id == chore_id && c.date == date));
    } else {
        next.completions.push(Completion {
            kid_id: kid_id.to_string(),
            chore_id: chore_id.to_string(),
            date,
        });
    }
    let completed = !was_completed;

    // Everything below is derived from the post-toggle completion set
    let (streak, full, run) = {
        let index = CompletionIndex::for_kid(&next.completions, kid_id);
        let streak = if completed {
            chore_run(&index, chore_id, yesterday_of(date)) + 1
        } else {
            0
        };
        let full = full_day(&next.chores, &index, kid_id, date);
        let run = if full {
            consecutive_full_days(&next.chores, &index, kid_id, date)
        } else {
            0
        };
        (streak, full, run)
    };

    let chore_delta: i64 = if completed {
        chore_points as i64
    } else {
        -(chore_points as i64)
    };
    let mut bonus_delta: i64 = 0;

    // An unchecked chore has no counter; `streak_for` reads a missing entry as 0
    if let Some(chore) = next.chores.iter_mut().find(|c| c.id == chore_id) {
        if completed {
            chore.streaks.insert(kid_id.to_string(), streak);
        } else {
            chore.streaks.remove(kid_id);
        }
    }

    let existing_bonus = next.streak_bonus(kid_id, date).map(|b| b.points);
    if full {
        if is_milestone(run) && existing_bonus.is_none() {
            info!("Streak milestone for kid {}: {} full days ending {}", kid_id, run, date);
            next.streak_bonuses.push(StreakBonus {
                id: StreakBonus::generate_id(kid_id, date),
                kid_id: kid_id.to_string(),
                date,
                streak_length: run,
                points: STREAK_BONUS_POINTS,
            });
            bonus_delta = STREAK_BONUS_POINTS as i64;
        }
    } else if let Some(bonus_points) = existing_bonus {
        info!("Revoking streak bonus for kid {} on {}: day is no longer full", kid_id, date);
        next.streak_bonuses.retain(|b| !(b.kid_id == kid_id && b.date == date));
        bonus_delta = -(bonus_points as i64);
    }

    // Chore points first, then the bonus, each clamped at zero on its own
    if let Some(kid) = next.kids.iter_mut().find(|k| k.id == kid_id) {
        kid.points = apply_delta(apply_delta(kid.points, chore_delta), bonus_delta);
    }

    debug!(
        "Toggled {} for kid {} on {}: completed={}, streak={}, full_day={}, run={}",
        chore_id, kid_id, date, completed, streak, full, run
    );

    Ok(next)
}

/// Add a signed delta to a balance, clamping at zero
pub fn apply_delta(points: u32, delta: i64) -> u32 {
    let result = (points as i64).saturating_add(delta);
    result.clamp(0, u32::MAX as i64) as u32
}
