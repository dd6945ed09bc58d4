//! Report aggregation over a date window.
//!
//! A report row is the net points a kid earned inside an inclusive window:
//! chore points from completions, manual adjustment deltas and streak bonuses.
//! This is independent of the kid's live balance, which is a running total
//! since the beginning of time. The net is what gets handed to a payout.

use chrono::{Local, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use shared::AppState;

use super::calendar::{self, DateRange};
use super::commands::payout::RecordPayoutCommand;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub kid_id: String,
    pub kid_name: String,
    pub chore_points: i64,
    pub adjustment_points: i64,
    pub bonus_points: i64,
    pub net: i64,
}

/// Window a report covers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportPeriod {
    /// Sunday-start week containing the date
    Week(NaiveDate),
    /// Calendar month containing the date
    Month(NaiveDate),
    Custom(DateRange),
}

impl ReportPeriod {
    pub fn range(&self) -> DateRange {
        match self {
            ReportPeriod::Week(date) => calendar::week_range(*date),
            ReportPeriod::Month(date) => calendar::month_range(*date),
            ReportPeriod::Custom(range) => *range,
        }
    }

    /// Human label, used as the payout period label
    pub fn label(&self) -> String {
        match self {
            ReportPeriod::Week(date) => {
                let range = calendar::week_range(*date);
                format!("Week of {}", calendar::format_short_date(range.start))
            }
            ReportPeriod::Month(date) => {
                use chrono::Datelike;
                format!("{} {}", calendar::month_name(date.month()), date.year())
            }
            ReportPeriod::Custom(range) => format!(
                "{} to {}",
                calendar::to_iso(range.start),
                calendar::to_iso(range.end)
            ),
        }
    }
}

/// Per-kid net points for the window, highest net first.
///
/// With a kid filter only that kid is reported (nothing if the id is
/// unknown). Completions of chores that no longer exist count as zero.
pub fn summarize(state: &AppState, kid_filter: Option<&str>, range: DateRange) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = state
        .kids
        .iter()
        .filter(|kid| kid_filter.map_or(true, |id| kid.id == id))
        .map(|kid| {
            let chore_points: i64 = state
                .completions
                .iter()
                .filter(|c| c.kid_id == kid.id && range.contains(c.date))
                .filter_map(|c| state.chore(&c.chore_id))
                .map(|chore| chore.points as i64)
                .fold(0i64, i64::saturating_add);

            let adjustment_points: i64 = state
                .adjustments
                .iter()
                .filter(|a| a.kid_id == kid.id)
                .filter(|a| range.contains(a.created_at.with_timezone(&Local).date_naive()))
                .map(|a| a.delta)
                .fold(0i64, i64::saturating_add);

            let bonus_points: i64 = state
                .streak_bonuses
                .iter()
                .filter(|b| b.kid_id == kid.id && range.contains(b.date))
                .map(|b| b.points as i64)
                .fold(0i64, i64::saturating_add);

            ReportRow {
                kid_id: kid.id.clone(),
                kid_name: kid.name.clone(),
                chore_points,
                adjustment_points,
                bonus_points,
                net: chore_points
                    .saturating_add(adjustment_points)
                    .saturating_add(bonus_points),
            }
        })
        .collect();

    // Stable sort keeps kid order for ties
    rows.sort_by(|a, b| b.net.cmp(&a.net));
    debug!("Summarized {} kids for {} to {}", rows.len(), range.start, range.end);
    rows
}

/// Build the payout command that cashes out a report row
pub fn payout_command_for(row: &ReportRow, period: &ReportPeriod) -> RecordPayoutCommand {
    let range = period.range();
    RecordPayoutCommand::new(row.kid_id.clone(), period.label(), range.start, range.end, row.net)
}
