use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use uuid::Uuid;

/// Schema version written by this build. Older blobs are upgraded on replace.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

/// Fixed reward for reaching a streak milestone
pub const STREAK_BONUS_POINTS: u32 = 5;

/// Streak milestones happen every this many consecutive full days
pub const STREAK_MILESTONE_INTERVAL: u32 = 10;

pub const DEFAULT_DOLLARS_PER_POINT: f64 = 0.1;

/// A child who earns points by doing chores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kid {
    /// Kid ID in format: "kid::<uuid>"
    pub id: String,
    pub name: String,
    /// Hex color used on the board, e.g. "#f97316"
    #[serde(default)]
    pub color: Option<String>,
    /// Emoji or image reference
    #[serde(default)]
    pub avatar: Option<String>,
    /// Running balance since the beginning of time, never negative
    #[serde(default)]
    pub points: u32,
}

/// When a chore is due
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Schedule {
    #[default]
    Daily,
    /// Days of week, 0 = Sunday through 6 = Saturday
    Weekly { days_of_week: BTreeSet<u8> },
    Custom { dates: BTreeSet<NaiveDate> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chore {
    /// Chore ID in format: "chore::<uuid>"
    pub id: String,
    pub title: String,
    /// Points earned per completion, always positive
    pub points: u32,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub assigned_kid_ids: Vec<String>,
    /// Consecutive-day completion count of this chore, per kid id
    #[serde(default)]
    pub streaks: BTreeMap<String, u32>,
    /// Display position, ascending. Values need not be contiguous.
    #[serde(default)]
    pub order: i64,
}

/// A kid finished a chore on a date. Unchecked completions are removed, not flagged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Completion {
    pub kid_id: String,
    pub chore_id: String,
    pub date: NaiveDate,
}

/// Audited manual change to a kid's balance. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Adjustment ID in format: "adjustment::<uuid>"
    pub id: String,
    pub kid_id: String,
    /// Requested change, positive or negative
    pub delta: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Automatically granted milestone reward for a run of full days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakBonus {
    /// Bonus ID in format: "bonus::<kid_id>::<date>"
    pub id: String,
    pub kid_id: String,
    /// Day the milestone was reached
    pub date: NaiveDate,
    /// Run length at the milestone, a multiple of 10
    pub streak_length: u32,
    pub points: u32,
}

/// Historical record that a window of net points was cashed out.
/// Recording one never changes the kid's balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    /// Payout ID in format: "payout::<uuid>"
    pub id: String,
    pub kid_id: String,
    /// Human-readable period, e.g. "October 2026"
    pub period_label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub points: i64,
    /// points * dollars_per_point, rounded to cents
    pub dollars: f64,
    pub created_at: DateTime<Utc>,
}

/// Catalog entry a kid could trade points for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    /// Reward ID in format: "reward::<uuid>"
    pub id: String,
    pub title: String,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_dollars_per_point")]
    pub dollars_per_point: f64,
    #[serde(default = "default_hide_completed")]
    pub hide_completed_on_board: bool,
}

fn default_dollars_per_point() -> f64 {
    DEFAULT_DOLLARS_PER_POINT
}

fn default_hide_completed() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dollars_per_point: DEFAULT_DOLLARS_PER_POINT,
            hide_completed_on_board: true,
        }
    }
}

/// Aggregate root holding everything the app knows.
///
/// Every collection defaults to empty when absent so that backups written
/// before adjustments and streak bonuses existed still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub kids: Vec<Kid>,
    #[serde(default)]
    pub chores: Vec<Chore>,
    #[serde(default)]
    pub rewards: Vec<Reward>,
    #[serde(default)]
    pub completions: Vec<Completion>,
    #[serde(default)]
    pub adjustments: Vec<Adjustment>,
    #[serde(default)]
    pub streak_bonuses: Vec<StreakBonus>,
    /// Newest first
    #[serde(default)]
    pub payouts: Vec<Payout>,
    #[serde(default)]
    pub settings: Settings,
}

// Blobs without a version predate versioning altogether.
fn default_schema_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            kids: Vec::new(),
            chores: Vec::new(),
            rewards: Vec::new(),
            completions: Vec::new(),
            adjustments: Vec::new(),
            streak_bonuses: Vec::new(),
            payouts: Vec::new(),
            settings: Settings::default(),
        }
    }
}

impl Kid {
    pub fn generate_id() -> String {
        format!("kid::{}", Uuid::new_v4())
    }
}

impl Chore {
    pub fn generate_id() -> String {
        format!("chore::{}", Uuid::new_v4())
    }

    pub fn is_assigned_to(&self, kid_id: &str) -> bool {
        self.assigned_kid_ids.iter().any(|id| id == kid_id)
    }

    /// Current streak counter for a kid, 0 when the kid has none
    pub fn streak_for(&self, kid_id: &str) -> u32 {
        self.streaks.get(kid_id).copied().unwrap_or(0)
    }
}

impl Adjustment {
    pub fn generate_id() -> String {
        format!("adjustment::{}", Uuid::new_v4())
    }
}

impl StreakBonus {
    pub fn generate_id(kid_id: &str, date: NaiveDate) -> String {
        format!("bonus::{}::{}", kid_id, date.format("%Y-%m-%d"))
    }
}

impl Payout {
    pub fn generate_id() -> String {
        format!("payout::{}", Uuid::new_v4())
    }
}

impl Reward {
    pub fn generate_id() -> String {
        format!("reward::{}", Uuid::new_v4())
    }
}

impl Schedule {
    /// Get the day name for a day-of-week number (0 = Sunday)
    pub fn day_name(day: u8) -> &'static str {
        match day {
            0 => "Sunday",
            1 => "Monday",
            2 => "Tuesday",
            3 => "Wednesday",
            4 => "Thursday",
            5 => "Friday",
            6 => "Saturday",
            _ => "Invalid",
        }
    }

    pub fn is_valid_day_of_week(day: u8) -> bool {
        day <= 6
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Daily => write!(f, "Every day"),
            Schedule::Weekly { days_of_week } => {
                let names: Vec<&str> = days_of_week.iter().map(|d| Schedule::day_name(*d)).collect();
                write!(f, "Weekly on {}", names.join(", "))
            }
            Schedule::Custom { dates } => write!(f, "{} specific dates", dates.len()),
        }
    }
}

impl AppState {
    pub fn kid(&self, kid_id: &str) -> Option<&Kid> {
        self.kids.iter().find(|k| k.id == kid_id)
    }

    pub fn chore(&self, chore_id: &str) -> Option<&Chore> {
        self.chores.iter().find(|c| c.id == chore_id)
    }

    pub fn reward(&self, reward_id: &str) -> Option<&Reward> {
        self.rewards.iter().find(|r| r.id == reward_id)
    }

    pub fn is_completed(&self, kid_id: &str, chore_id: &str, date: NaiveDate) -> bool {
        self.completions
            .iter()
            .any(|c| c.kid_id == kid_id && c.chore_id == chore_id && c.date == date)
    }

    pub fn streak_bonus(&self, kid_id: &str, date: NaiveDate) -> Option<&StreakBonus> {
        self.streak_bonuses.iter().find(|b| b.kid_id == kid_id && b.date == date)
    }

    /// Chores sorted by display order
    pub fn sorted_chores(&self) -> Vec<&Chore> {
        let mut chores: Vec<&Chore> = self.chores.iter().collect();
        chores.sort_by_key(|c| c.order);
        chores
    }

    /// Restore the invariants on a blob that came from outside the reducer.
    ///
    /// Drops duplicate completions and streak bonuses (first one wins), and
    /// any completion, adjustment or bonus that points at a kid who no longer
    /// exists. Completions of unknown chores are dropped as well, and chores
    /// forget assignments and streak counters of missing kids.
    pub fn normalized(mut self) -> Self {
        let kid_ids: HashSet<String> = self.kids.iter().map(|k| k.id.clone()).collect();
        let chore_ids: HashSet<String> = self.chores.iter().map(|c| c.id.clone()).collect();

        let mut seen_completions = HashSet::new();
        self.completions.retain(|c| {
            kid_ids.contains(&c.kid_id)
                && chore_ids.contains(&c.chore_id)
                && seen_completions.insert((c.kid_id.clone(), c.chore_id.clone(), c.date))
        });

        let mut seen_bonuses = HashSet::new();
        self.streak_bonuses.retain(|b| {
            kid_ids.contains(&b.kid_id) && seen_bonuses.insert((b.kid_id.clone(), b.date))
        });

        self.adjustments.retain(|a| kid_ids.contains(&a.kid_id));

        for chore in self.chores.iter_mut() {
            chore.assigned_kid_ids.retain(|id| kid_ids.contains(id));
            chore.streaks.retain(|id, _| kid_ids.contains(id));
        }
        self
    }
}
