use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::info;

use chore_tracker_backend::domain::calendar::{self, DateRange};
use chore_tracker_backend::domain::commands::chore::{
    AddChoreCommand, DeleteChoreCommand, ReorderChoresCommand, ToggleCompletionCommand,
};
use chore_tracker_backend::domain::commands::kid::{
    AddKidCommand, AdjustPointsCommand, DeleteKidCommand, UpdateKidCommand,
};
use chore_tracker_backend::domain::commands::reward::{
    AddRewardCommand, DeleteRewardCommand, RedeemRewardCommand,
};
use chore_tracker_backend::domain::commands::settings::UpdateSettingsCommand;
use chore_tracker_backend::domain::commands::Action;
use chore_tracker_backend::domain::{ReplaceConfirmation, ReportPeriod};
use chore_tracker_backend::shared::{AppState, Schedule};
use chore_tracker_backend::storage::{GlobalConfigRepository, JsonConnection, StateRepository};
use chore_tracker_backend::Backend;

type JsonBackend = Backend<StateRepository<JsonConnection>>;

#[derive(Debug, Parser)]
#[command(name = "chore-tracker", version, about = "Chores, points and streak bonuses for kids")]
struct Cli {
    /// Data directory (overrides CHORE_TRACKER_DATA_DIR and the redirect file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Add a kid
    AddKid {
        name: String,
        /// Hex color; picked from the palette when omitted
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Rename a kid or change their color or avatar
    EditKid {
        /// Kid id or name
        kid: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
    },

    /// Delete a kid and all of their completions, adjustments and bonuses
    DeleteKid {
        /// Kid id or name
        kid: String,
    },

    /// Add or remove points by hand
    Adjust {
        /// Kid id or name
        kid: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
        #[arg(short, long, default_value = "")]
        reason: String,
    },

    /// Add a chore
    AddChore {
        title: String,
        #[arg(short, long)]
        points: u32,
        /// Kid ids or names, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        kids: Vec<String>,
        /// Weekdays (sun..sat or 0..6), comma separated
        #[arg(long, value_delimiter = ',', conflicts_with = "dates")]
        weekly: Vec<String>,
        /// Specific YYYY-MM-DD dates, comma separated
        #[arg(long, value_delimiter = ',')]
        dates: Vec<String>,
    },

    /// Delete a chore and its completions
    DeleteChore {
        /// Chore id or title
        chore: String,
    },

    /// Set the display order of chores
    Reorder {
        /// Chore ids or titles in the new order
        #[arg(required = true)]
        chores: Vec<String>,
    },

    /// Check or uncheck a chore for a kid
    Toggle {
        /// Kid id or name
        kid: String,
        /// Chore id or title
        chore: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Add a reward
    AddReward {
        title: String,
        cost: u32,
    },

    /// Delete a reward
    DeleteReward {
        /// Reward id or title
        reward: String,
    },

    /// Redeem a reward for a kid
    Redeem {
        /// Kid id or name
        kid: String,
        /// Reward id or title
        reward: String,
    },

    /// Change settings
    Settings {
        /// Dollars paid out per point
        #[arg(long)]
        rate: Option<f64>,
        /// Hide completed chores on the board
        #[arg(long)]
        hide_completed: Option<bool>,
    },

    /// Net points per kid for a period
    Report {
        /// Kid id or name; all kids when omitted
        #[arg(short, long)]
        kid: Option<String>,
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Record payouts of the net points for a period
    Payout {
        /// Kid id or name; all kids when omitted
        #[arg(short, long)]
        kid: Option<String>,
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Show a kid's chores for a day
    Board {
        /// Kid id or name
        kid: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show a kid's month at a glance
    Calendar {
        /// Kid id or name
        kid: String,
        /// YYYY-MM, defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
        /// Months to move from --month; negative goes back
        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        shift: i32,
    },

    /// Write a backup file
    Export {
        /// Target directory; defaults to the configured backup directory
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Make --dir the default for future exports
        #[arg(long, requires = "dir")]
        remember: bool,
    },

    /// Replace ALL data with a backup file
    Import {
        file: PathBuf,
        /// Confirm the overwrite
        #[arg(long)]
        yes: bool,
    },

    /// Delete ALL data
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Print everything
    Show,
}

/// Report window; the current week when nothing is given
#[derive(Debug, Args)]
struct PeriodArgs {
    /// Sunday-start week containing this date
    #[arg(long, conflicts_with_all = ["month", "from"])]
    week: Option<String>,
    /// Month containing this date (YYYY-MM or YYYY-MM-DD)
    #[arg(long, conflicts_with = "from")]
    month: Option<String>,
    #[arg(long, requires = "to")]
    from: Option<String>,
    #[arg(long, requires = "from")]
    to: Option<String>,
}

impl PeriodArgs {
    fn resolve(&self) -> Result<ReportPeriod> {
        if let (Some(from), Some(to)) = (&self.from, &self.to) {
            let range = DateRange::new(parse_date(from)?, parse_date(to)?);
            if range.start > range.end {
                bail!("--from {} is after --to {}", from, to);
            }
            return Ok(ReportPeriod::Custom(range));
        }
        if let Some(month) = &self.month {
            return Ok(ReportPeriod::Month(parse_month(month)?));
        }
        let date = match &self.week {
            Some(week) => parse_date(week)?,
            None => calendar::today(),
        };
        Ok(ReportPeriod::Week(date))
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    calendar::parse_iso(value).ok_or_else(|| anyhow!("Invalid date '{}', expected YYYY-MM-DD", value))
}

fn date_or_today(value: &Option<String>) -> Result<NaiveDate> {
    value.as_deref().map(parse_date).unwrap_or_else(|| Ok(calendar::today()))
}

/// First day of the month, from YYYY-MM or any YYYY-MM-DD in it
fn parse_month(value: &str) -> Result<NaiveDate> {
    if let Some(date) = calendar::parse_iso(value) {
        return Ok(date.with_day(1).unwrap_or(date));
    }
    calendar::parse_iso(&format!("{}-01", value))
        .ok_or_else(|| anyhow!("Invalid month '{}', expected YYYY-MM", value))
}

/// Step `shift` months forward (or back when negative)
fn shift_month(month: u32, year: i32, shift: i32) -> (u32, i32) {
    let step: fn(u32, i32) -> (u32, i32) = if shift < 0 {
        calendar::previous_month
    } else {
        calendar::next_month
    };
    (0..shift.unsigned_abs()).fold((month, year), |(m, y), _| step(m, y))
}

fn parse_weekday(value: &str) -> Result<u8> {
    let value = value.trim().to_lowercase();
    if let Ok(day) = value.parse::<u8>() {
        return Ok(day);
    }
    (0u8..7)
        .find(|day| {
            let name = Schedule::day_name(*day).to_lowercase();
            value.len() >= 3 && name.starts_with(&value)
        })
        .ok_or_else(|| anyhow!("Unknown weekday '{}'", value))
}

fn parse_schedule(weekly: &[String], dates: &[String]) -> Result<Schedule> {
    if !weekly.is_empty() {
        let days_of_week = weekly.iter().map(|d| parse_weekday(d)).collect::<Result<BTreeSet<u8>>>()?;
        return Ok(Schedule::Weekly { days_of_week });
    }
    if !dates.is_empty() {
        let dates = dates.iter().map(|d| parse_date(d)).collect::<Result<BTreeSet<NaiveDate>>>()?;
        return Ok(Schedule::Custom { dates });
    }
    Ok(Schedule::Daily)
}

/// Match by exact id first, then by case-insensitive name
fn resolve<'a, T>(
    items: &'a [T],
    key: &str,
    entity: &str,
    id_of: impl Fn(&T) -> &str,
    name_of: impl Fn(&T) -> &str,
) -> Result<&'a T> {
    if let Some(item) = items.iter().find(|i| id_of(i) == key) {
        return Ok(item);
    }
    let matches: Vec<&T> = items.iter().filter(|i| name_of(i).eq_ignore_ascii_case(key)).collect();
    match matches.as_slice() {
        [item] => Ok(*item),
        [] => Err(anyhow!("No {} matches '{}'", entity, key)),
        _ => Err(anyhow!("More than one {} is named '{}'; use the id", entity, key)),
    }
}

fn find_kid_id(state: &AppState, key: &str) -> Result<String> {
    resolve(&state.kids, key, "kid", |k| k.id.as_str(), |k| k.name.as_str()).map(|k| k.id.clone())
}

fn find_chore_id(state: &AppState, key: &str) -> Result<String> {
    resolve(&state.chores, key, "chore", |c| c.id.as_str(), |c| c.title.as_str()).map(|c| c.id.clone())
}

fn find_reward_id(state: &AppState, key: &str) -> Result<String> {
    resolve(&state.rewards, key, "reward", |r| r.id.as_str(), |r| r.title.as_str()).map(|r| r.id.clone())
}

fn kid_name(state: &AppState, kid_id: &str) -> String {
    state.kid(kid_id).map(|k| k.name.clone()).unwrap_or_else(|| kid_id.to_string())
}

fn open_connection(data_dir: Option<PathBuf>) -> Result<JsonConnection> {
    match data_dir {
        Some(dir) => JsonConnection::new(dir),
        None => JsonConnection::new_default(),
    }
}

fn run(cli: Cli) -> Result<()> {
    let connection = open_connection(cli.data_dir)?;
    info!("Using data directory {}", connection.base_directory().display());
    let config_repository = GlobalConfigRepository::new(connection.clone());
    let mut backend: JsonBackend = Backend::new(StateRepository::new(connection.clone()));

    match cli.command {
        Commands::AddKid { name, color, avatar } => {
            let mut command = AddKidCommand::new(name);
            command.color = color;
            command.avatar = avatar;
            let id = command.id.clone();
            let state = backend.dispatch(Action::AddKid(command))?;
            println!("Added {} ({})", kid_name(state, &id), id);
        }
        Commands::EditKid { kid, name, color, avatar } => {
            let kid_id = find_kid_id(backend.state(), &kid)?;
            backend.dispatch(Action::UpdateKid(UpdateKidCommand { kid_id: kid_id.clone(), name, color, avatar }))?;
            println!("Updated {}", kid_name(backend.state(), &kid_id));
        }
        Commands::DeleteKid { kid } => {
            let kid_id = find_kid_id(backend.state(), &kid)?;
            let name = kid_name(backend.state(), &kid_id);
            backend.dispatch(Action::DeleteKid(DeleteKidCommand { kid_id }))?;
            println!("Deleted {}", name);
        }
        Commands::Adjust { kid, delta, reason } => {
            let kid_id = find_kid_id(backend.state(), &kid)?;
            let state = backend.dispatch(Action::AdjustPoints(AdjustPointsCommand::new(kid_id.clone(), delta, reason)))?;
            let points = state.kid(&kid_id).map(|k| k.points).unwrap_or(0);
            println!("{} now has {} points", kid_name(state, &kid_id), points);
        }
        Commands::AddChore { title, points, kids, weekly, dates } => {
            let kid_ids = kids
                .iter()
                .map(|k| find_kid_id(backend.state(), k))
                .collect::<Result<Vec<_>>>()?;
            let schedule = parse_schedule(&weekly, &dates)?;
            let command = AddChoreCommand::new(title, points, schedule, kid_ids);
            let id = command.id.clone();
            let state = backend.dispatch(Action::AddChore(command))?;
            if let Some(chore) = state.chore(&id) {
                println!("Added '{}' worth {} points, {} ({})", chore.title, chore.points, chore.schedule, chore.id);
            }
        }
        Commands::DeleteChore { chore } => {
            let chore_id = find_chore_id(backend.state(), &chore)?;
            backend.dispatch(Action::DeleteChore(DeleteChoreCommand { chore_id: chore_id.clone() }))?;
            println!("Deleted chore {}", chore_id);
        }
        Commands::Reorder { chores } => {
            let chore_ids = chores
                .iter()
                .map(|c| find_chore_id(backend.state(), c))
                .collect::<Result<Vec<_>>>()?;
            let state = backend.dispatch(Action::ReorderChores(ReorderChoresCommand { chore_ids }))?;
            for (position, chore) in state.sorted_chores().iter().enumerate() {
                println!("{:>3}. {}", position + 1, chore.title);
            }
        }
        Commands::Toggle { kid, chore, date } => {
            let kid_id = find_kid_id(backend.state(), &kid)?;
            let chore_id = find_chore_id(backend.state(), &chore)?;
            let date = date_or_today(&date)?;
            let state = backend.dispatch(Action::ToggleCompletion(ToggleCompletionCommand {
                kid_id: kid_id.clone(),
                chore_id: chore_id.clone(),
                date,
            }))?;

            let done = state.is_completed(&kid_id, &chore_id, date);
            let points = state.kid(&kid_id).map(|k| k.points).unwrap_or(0);
            println!(
                "{} {} on {} ({} points)",
                if done { "✅ Checked" } else { "Unchecked" },
                state.chore(&chore_id).map(|c| c.title.as_str()).unwrap_or(""),
                calendar::format_date_for_display(date),
                points
            );
            if let Some(bonus) = state.streak_bonus(&kid_id, date) {
                println!("🔥 {}-day streak bonus: +{} points", bonus.streak_length, bonus.points);
            }
        }
        Commands::AddReward { title, cost } => {
            let command = AddRewardCommand::new(title, cost);
            let id = command.id.clone();
            backend.dispatch(Action::AddReward(command))?;
            println!("Added reward {}", id);
        }
        Commands::DeleteReward { reward } => {
            let reward_id = find_reward_id(backend.state(), &reward)?;
            backend.dispatch(Action::DeleteReward(DeleteRewardCommand { reward_id: reward_id.clone() }))?;
            println!("Deleted reward {}", reward_id);
        }
        Commands::Redeem { kid, reward } => {
            let kid_id = find_kid_id(backend.state(), &kid)?;
            let reward_id = find_reward_id(backend.state(), &reward)?;
            backend.dispatch(Action::RedeemReward(RedeemRewardCommand { kid_id, reward_id }))?;
            println!("Reward redemption is not available yet; nothing changed.");
        }
        Commands::Settings { rate, hide_completed } => {
            let state = backend.dispatch(Action::UpdateSettings(UpdateSettingsCommand {
                dollars_per_point: rate,
                hide_completed_on_board: hide_completed,
            }))?;
            println!(
                "${:.2} per point, completed chores {} on the board",
                state.settings.dollars_per_point,
                if state.settings.hide_completed_on_board { "hidden" } else { "shown" }
            );
        }
        Commands::Report { kid, period } => {
            let kid_id = kid.map(|k| find_kid_id(backend.state(), &k)).transpose()?;
            let period = period.resolve()?;
            let rows = backend.report(kid_id.as_deref(), &period);
            println!("{}", period.label());
            println!("{:<20} {:>7} {:>7} {:>7} {:>7}", "Kid", "Chores", "Adjust", "Bonus", "Net");
            for row in rows {
                println!(
                    "{:<20} {:>7} {:>7} {:>7} {:>7}",
                    row.kid_name, row.chore_points, row.adjustment_points, row.bonus_points, row.net
                );
            }
        }
        Commands::Payout { kid, period } => {
            let kid_id = kid.map(|k| find_kid_id(backend.state(), &k)).transpose()?;
            let period = period.resolve()?;
            let count = backend.pay_out(kid_id.as_deref(), &period)?;
            for payout in backend.state().payouts.iter().take(count) {
                println!(
                    "💰 {}: {} points = ${:.2} ({})",
                    kid_name(backend.state(), &payout.kid_id),
                    payout.points,
                    payout.dollars,
                    payout.period_label
                );
            }
            if count == 0 {
                println!("Nothing to pay out for {}", period.label());
            }
        }
        Commands::Board { kid, date } => {
            let kid_id = find_kid_id(backend.state(), &kid)?;
            let date = date_or_today(&date)?;
            println!("{} - {}", kid_name(backend.state(), &kid_id), calendar::format_date_for_display(date));
            let items = backend.board(&kid_id, date);
            if items.is_empty() {
                println!("Nothing left to do 🎉");
            }
            for item in items {
                let mark = if item.completed { "[x]" } else { "[ ]" };
                let streak = if item.streak > 1 { format!("  🔥 {}", item.streak) } else { String::new() };
                println!("{} {} ({} pts){}", mark, item.title, item.points, streak);
            }
        }
        Commands::Calendar { kid, month, shift } => {
            let kid_id = find_kid_id(backend.state(), &kid)?;
            let first = match month {
                Some(month) => parse_month(&month)?,
                None => parse_month(&calendar::to_iso(calendar::today()))?,
            };
            let (month, year) = shift_month(first.month(), first.year(), shift);
            let progress = backend.month(&kid_id, year, month);
            println!("{} {}", calendar::month_name(progress.month), progress.year);
            println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
            let mut line = "     ".repeat(progress.leading_padding as usize);
            for (i, day) in progress.days.iter().enumerate() {
                let cell = match (day.due, day.is_full, day.bonus_points.is_some()) {
                    (0, _, _) => format!("{:>3}  ", day.date.day()),
                    (_, true, true) => format!("{:>3}🔥", day.date.day()),
                    (_, true, false) => format!("{:>3}* ", day.date.day()),
                    _ => format!("{:>3}. ", day.date.day()),
                };
                line.push_str(&cell);
                if (progress.leading_padding as usize + i + 1) % 7 == 0 {
                    println!("{}", line);
                    line.clear();
                }
            }
            if !line.is_empty() {
                println!("{}", line);
            }
            let (prev_month, prev_year) = calendar::previous_month(month, year);
            let (next_month, next_year) = calendar::next_month(month, year);
            println!("‹ {}-{:02}    {}-{:02} ›", prev_year, prev_month, next_year, next_month);
        }
        Commands::Export { dir, remember } => {
            let directory = match dir {
                Some(dir) => dir,
                None => config_repository
                    .get_global_config()?
                    .backup_directory
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
            };
            let path = backend.export_to(&directory)?;
            if remember {
                config_repository.set_backup_directory(Some(directory.display().to_string()))?;
            }
            println!("📄 Backup written to {}", path.display());
        }
        Commands::Import { file, yes } => {
            let pending = backend
                .preview_import(&file)
                .with_context(|| format!("Could not import {}", file.display()))?;
            let summary = pending.summary();
            println!(
                "Backup (schema v{}): {} kids, {} chores, {} completions, {} payouts",
                summary.schema_version, summary.kids, summary.chores, summary.completions, summary.payouts
            );
            if !yes {
                bail!("Importing replaces ALL current data. Re-run with --yes to confirm.");
            }
            backend.import(pending, ReplaceConfirmation::destructive_overwrite_confirmed())?;
            println!("✅ Imported {}", file.display());
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("Reset deletes ALL data. Re-run with --yes to confirm.");
            }
            backend.dispatch(Action::ResetAll)?;
            println!("All data deleted");
        }
        Commands::Show => print_state(backend.state()),
    }

    Ok(())
}

fn print_state(state: &AppState) {
    println!("Kids:");
    for kid in &state.kids {
        println!("  {} {} - {} points ({})", kid.avatar.as_deref().unwrap_or("•"), kid.name, kid.points, kid.id);
    }

    println!("Chores:");
    for chore in state.sorted_chores() {
        let assigned: Vec<String> = chore.assigned_kid_ids.iter().map(|id| kid_name(state, id)).collect();
        println!(
            "  {:>3}. {} - {} pts, {}, for {} ({})",
            chore.order,
            chore.title,
            chore.points,
            chore.schedule,
            assigned.join(", "),
            chore.id
        );
    }

    println!("Rewards:");
    for reward in &state.rewards {
        println!("  {} - {} pts ({})", reward.title, reward.cost, reward.id);
    }

    println!("Payouts:");
    for payout in &state.payouts {
        println!(
            "  {} {}: {} pts = ${:.2}",
            payout.period_label,
            kid_name(state, &payout.kid_id),
            payout.points,
            payout.dollars
        );
    }

    println!(
        "Settings: ${:.2} per point, hide completed: {}",
        state.settings.dollars_per_point, state.settings.hide_completed_on_board
    );
}

fn main() -> Result<()> {
    env_logger::init();
    run(Cli::parse())
}
