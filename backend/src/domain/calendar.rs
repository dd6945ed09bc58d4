//! Calendar domain logic for the chore tracker.
//!
//! Pure date arithmetic: ISO formatting, whether a chore is due on a date,
//! and the month/week ranges used by the board, the calendar view and the
//! reports. Dates are calendar dates, never instants; the only hidden "now"
//! is [`today`].

use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::{Chore, Schedule};

/// Inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the range, ascending. Empty if start is after end.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Whether the chore's schedule lands on this date, regardless of assignment
pub fn is_due(chore: &Chore, date: NaiveDate) -> bool {
    match &chore.schedule {
        Schedule::Daily => true,
        Schedule::Weekly { days_of_week } => {
            let weekday = date.weekday().num_days_from_sunday() as u8;
            days_of_week.contains(&weekday)
        }
        Schedule::Custom { dates } => dates.contains(&date),
    }
}

/// Whether the chore is due for this particular kid on this date.
/// A chore nobody is assigned to is never due.
pub fn is_due_for(chore: &Chore, kid_id: &str, date: NaiveDate) -> bool {
    chore.is_assigned_to(kid_id) && is_due(chore, date)
}

/// Every calendar day in the month, ascending. Empty for an invalid month.
pub fn month_days(year: i32, month: u32) -> Vec<NaiveDate> {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(first) => {
            let days = days_in_month(month, year);
            first.iter_days().take(days as usize).collect()
        }
        None => Vec::new(),
    }
}

/// Sunday-start week containing the date
pub fn week_range(date: NaiveDate) -> DateRange {
    let offset = date.weekday().num_days_from_sunday() as i64;
    let start = date - Duration::days(offset);
    DateRange::new(start, start + Duration::days(6))
}

/// First through last day of the month containing the date
pub fn month_range(date: NaiveDate) -> DateRange {
    let start = date.with_day(1).unwrap_or(date);
    let last_day = days_in_month(date.month(), date.year());
    let end = date.with_day(last_day).unwrap_or(date);
    DateRange::new(start, end)
}

pub fn to_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` date. Anything after a `T` is ignored so RFC 3339
/// timestamps are accepted too.
pub fn parse_iso(date_str: &str) -> Option<NaiveDate> {
    let date_part = date_str.split('T').next()?;
    NaiveDate::parse_from_str(date_part.trim(), "%Y-%m-%d").ok()
}

/// Today's local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn yesterday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}

/// Get the number of days in a given month and year
pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Get the first day of month (0 = Sunday, 1 = Monday, etc.)
pub fn first_day_of_month(month: u32, year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|date| date.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January", 2 => "February", 3 => "March", 4 => "April",
        5 => "May", 6 => "June", 7 => "July", 8 => "August",
        9 => "September", 10 => "October", 11 => "November", 12 => "December",
        _ => "Invalid Month",
    }
}

pub fn previous_month(current_month: u32, current_year: i32) -> (u32, i32) {
    if current_month == 1 {
        (12, current_year - 1)
    } else {
        (current_month - 1, current_year)
    }
}

pub fn next_month(current_month: u32, current_year: i32) -> (u32, i32) {
    if current_month == 12 {
        (1, current_year + 1)
    } else {
        (current_month + 1, current_year)
    }
}

/// Format a date for human-readable display, e.g. "June 13, 2025"
pub fn format_date_for_display(date: NaiveDate) -> String {
    format!("{} {}, {}", month_name(date.month()), date.day(), date.year())
}

/// Short form used in period labels, e.g. "Jun 13, 2025"
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
