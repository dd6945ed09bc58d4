//! Read-only views a board or calendar screen renders from.
//!
//! Nothing here changes state. The board lists what a kid still has to do
//! today; the month view shows, day by day, how much of each day got done and
//! where streak bonuses landed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::AppState;

use super::calendar::{self, is_due_for};
use super::streak_engine::{full_day, CompletionIndex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardItem {
    pub chore_id: String,
    pub title: String,
    pub points: u32,
    pub completed: bool,
    /// Current consecutive-day counter for this chore and kid
    pub streak: u32,
}

/// Chores due for the kid on the date, in display order.
/// Completed chores are left out when the board hides them.
pub fn board_for(state: &AppState, kid_id: &str, date: NaiveDate) -> Vec<BoardItem> {
    let index = CompletionIndex::for_kid(&state.completions, kid_id);
    state
        .sorted_chores()
        .into_iter()
        .filter(|chore| is_due_for(chore, kid_id, date))
        .map(|chore| BoardItem {
            chore_id: chore.id.clone(),
            title: chore.title.clone(),
            points: chore.points,
            completed: index.contains(&chore.id, date),
            streak: chore.streak_for(kid_id),
        })
        .filter(|item| !(state.settings.hide_completed_on_board && item.completed))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayProgress {
    pub date: NaiveDate,
    /// Chores due for the kid that day
    pub due: usize,
    /// How many of those were completed
    pub done: usize,
    pub is_full: bool,
    /// Streak bonus granted on this day, if any
    pub bonus_points: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthProgress {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the first day in a Sunday-start grid
    pub leading_padding: u32,
    pub days: Vec<DayProgress>,
}

pub fn month_progress(state: &AppState, kid_id: &str, year: i32, month: u32) -> MonthProgress {
    let index = CompletionIndex::for_kid(&state.completions, kid_id);

    let days = calendar::month_days(year, month)
        .into_iter()
        .map(|date| {
            let due: Vec<_> = state
                .chores
                .iter()
                .filter(|chore| is_due_for(chore, kid_id, date))
                .collect();
            let done = due.iter().filter(|chore| index.contains(&chore.id, date)).count();
            DayProgress {
                date,
                due: due.len(),
                done,
                is_full: full_day(&state.chores, &index, kid_id, date),
                bonus_points: state.streak_bonus(kid_id, date).map(|b| b.points),
            }
        })
        .collect();

    MonthProgress {
        year,
        month,
        leading_padding: calendar::first_day_of_month(month, year),
        days,
    }
}
