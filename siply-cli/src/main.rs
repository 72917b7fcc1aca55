use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use siply_core::constants::{
    HISTORY_RETENTION_DAYS, QUICK_LOG_MAX_PRESETS, QUICK_LOG_MIN_PRESETS,
};
use siply_core::time::{date_key, parse_local_instant};
use siply_core::{
    ScheduleStatus, compute_best_hours, compute_hydration_plan, compute_reminder_schedule,
    compute_streak_stats, good_threshold_ml, liters_to_ml, reset_history_for_date, trim_history,
    update_history_for_log,
};

mod config;
mod notify_cmd;
mod state;

/// Config key routed to the quick-log state file instead of config.toml.
const QUICK_LOG_PRESETS_KEY: &str = "quick_log_presets";

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SIPLY_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "siply", version, long_version = LONG_VERSION, about = "Drink water, on time.")]
struct Cli {
    /// Pretend the local time is "YYYY-MM-DD HH:MM"
    #[arg(long, global = true)]
    at: Option<String>,

    /// Log scheduling decisions to stderr
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage ~/.siply/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Show reminder slots for the next 24 hours
    Schedule {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show today's plan at a glance
    Plan {
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Log a drink against today's progress; with no amount, repeats the last one
    Log {
        /// Amount in ml
        ml: Option<i64>,

        /// Log quick-log preset N (1-based, see `siply presets`)
        #[arg(long, conflicts_with = "ml")]
        preset: Option<usize>,
    },

    /// Show quick-log presets and the last logged amount
    Presets,

    /// Zero today's progress
    Reset,

    /// Consumed vs target and the next reminder
    Status,

    /// Streaks and favourite drinking hours
    Insights,

    /// Local notification queue
    Notify {
        #[command(subcommand)]
        command: notify_cmd::NotifyCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
    /// Set one key, e.g. `siply config set window_end 01:00`
    /// or `siply config set quick_log_presets 150,250,500`
    Set { key: String, value: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let now = resolve_now(cli.at.as_deref())?;

    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                print!("{}", toml::to_string_pretty(&cfg)?);
            }
            ConfigCommand::Set { key, value } if key == QUICK_LOG_PRESETS_KEY => {
                set_quick_log_presets(&value)?;
                println!("Set {key} = {value}");
            }
            ConfigCommand::Set { key, value } => {
                let mut cfg = config::load_config()?;
                config::set_value(&mut cfg, &key, &value)?;
                config::save_config(&cfg)?;
                println!("Set {key} = {value}");
            }
        },
        Command::Schedule { json } => schedule(now, json)?,
        Command::Plan { json } => plan(now, json)?,
        Command::Log { ml, preset } => {
            let amount = resolve_log_amount(ml, preset)?;
            log_drink(now, amount)?
        }
        Command::Presets => presets()?,
        Command::Reset => reset(now)?,
        Command::Status => status(now)?,
        Command::Insights => insights(now)?,
        Command::Notify { command } => notify_cmd::run(command, now)?,
    }

    Ok(())
}

fn resolve_now(at: Option<&str>) -> Result<NaiveDateTime> {
    match at {
        Some(s) => parse_local_instant(s),
        None => Ok(Local::now().naive_local()),
    }
}

fn schedule(now: NaiveDateTime, json: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let progress = state::read_progress(&date_key(now))?;
    let result = compute_reminder_schedule(now, &cfg.hydration, progress.consumed_ml);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match result.status {
        ScheduleStatus::ConfigError => {
            bail!("sip size and target must be positive; check `siply config show`")
        }
        ScheduleStatus::NoWindow => {
            println!("Reminder window is empty (start equals end); nothing to schedule.");
            return Ok(());
        }
        ScheduleStatus::TargetMet => println!("Target met for today.\n"),
        ScheduleStatus::Success => {}
    }

    println!(
        "Window {}-{} | consumed {} ml | {} reminders in the next 24h\n",
        cfg.hydration.window_start,
        cfg.hydration.window_end,
        progress.consumed_ml,
        result.slots.len()
    );
    for slot in &result.slots {
        println!(
            "- {} | ~{} ml ({} sips) | every {} min",
            slot.time.format("%a %H:%M"),
            slot.ml_per_reminder,
            slot.sips_per_reminder,
            slot.interval_minutes
        );
    }
    Ok(())
}

fn plan(now: NaiveDateTime, json: bool) -> Result<()> {
    let cfg = config::load_config()?;
    let progress = state::read_progress(&date_key(now))?;
    let plan = compute_hydration_plan(now, &cfg.hydration, progress.consumed_ml);

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("# Plan for {}\n", date_key(now));
    println!("Target: {} ml (consumed {} ml)", plan.target_ml, plan.consumed_ml);
    println!("Reminders per day: {}", plan.reminders_per_day);
    println!("Per reminder: ~{} ml ({} sips)", plan.ml_per_reminder, plan.sips_per_reminder);
    match plan.next_reminder_at {
        Some(t) => println!("Next reminder: {}", t.format("%a %H:%M")),
        None => println!("Next reminder: none"),
    }
    Ok(())
}

/// Amount for `siply log`: explicit ml, a preset, or the last logged amount.
fn resolve_log_amount(ml: Option<i64>, preset: Option<usize>) -> Result<i64> {
    if let Some(ml) = ml {
        return Ok(ml);
    }
    let quick_log = state::read_quick_log()?;
    match preset {
        Some(n) => match quick_log.preset(n) {
            Some(ml) => Ok(ml),
            None => bail!("no preset #{n}; {} presets are defined", quick_log.presets.len()),
        },
        None => match quick_log.last_used_ml {
            Some(ml) => Ok(ml),
            None => bail!("nothing logged yet; give an amount in ml or --preset N"),
        },
    }
}

fn parse_preset_list(value: &str) -> Result<Vec<i64>> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .with_context(|| format!("parse preset '{part}'"))
        })
        .collect()
}

fn set_quick_log_presets(value: &str) -> Result<()> {
    let raw = parse_preset_list(value)?;
    let mut quick_log = state::read_quick_log()?;
    if !quick_log.set_presets(&raw) {
        bail!(
            "need at least {QUICK_LOG_MIN_PRESETS} distinct positive presets (max {QUICK_LOG_MAX_PRESETS})"
        );
    }
    state::write_quick_log(&quick_log)?;
    tracing::info!(presets = ?quick_log.presets, "quick-log presets updated");
    Ok(())
}

fn presets() -> Result<()> {
    let quick_log = state::read_quick_log()?;
    for (i, ml) in quick_log.presets.iter().enumerate() {
        println!("{}. {} ml", i + 1, ml);
    }
    match quick_log.last_used_ml {
        Some(ml) => println!("Last logged: {ml} ml"),
        None => println!("Last logged: none"),
    }
    Ok(())
}

fn log_drink(now: NaiveDateTime, ml: i64) -> Result<()> {
    if ml <= 0 {
        bail!("amount must be positive (got {ml} ml)");
    }
    let cfg = config::load_config()?;
    let today = date_key(now);
    let goal_ml = liters_to_ml(cfg.hydration.target_liters);
    let good_ml = good_threshold_ml(&cfg.hydration);

    let mut progress = state::read_progress(&today)?;
    progress.log(ml);
    state::write_progress(&progress)?;

    let mut history = state::read_history()?;
    update_history_for_log(&mut history, now, ml, goal_ml, good_ml);
    trim_history(&mut history, now, HISTORY_RETENTION_DAYS);
    state::write_history(&history)?;

    let mut quick_log = state::read_quick_log()?;
    quick_log.record_use(ml);
    state::write_quick_log(&quick_log)?;

    tracing::info!(ml, total = progress.consumed_ml, "logged drink");
    println!("Logged {} ml. Today: {} / {} ml", ml, progress.consumed_ml, goal_ml);
    if progress.consumed_ml >= goal_ml {
        println!("Target met. Remaining reminders for today are dropped on the next reschedule.");
    }
    Ok(())
}

fn reset(now: NaiveDateTime) -> Result<()> {
    let cfg = config::load_config()?;
    let today = date_key(now);

    state::write_progress(&siply_core::Progress::new(today.clone()))?;

    let mut history = state::read_history()?;
    reset_history_for_date(
        &mut history,
        &today,
        liters_to_ml(cfg.hydration.target_liters),
        good_threshold_ml(&cfg.hydration),
    );
    state::write_history(&history)?;

    println!("Reset progress for {today}.");
    Ok(())
}

fn status(now: NaiveDateTime) -> Result<()> {
    let cfg = config::load_config()?;
    let progress = state::read_progress(&date_key(now))?;
    let plan = compute_hydration_plan(now, &cfg.hydration, progress.consumed_ml);

    let pct = if plan.target_ml > 0 {
        progress.consumed_ml.saturating_mul(100) / plan.target_ml
    } else {
        0
    };
    println!("Today: {} / {} ml ({}%)", progress.consumed_ml, plan.target_ml, pct);
    match plan.next_reminder_at {
        Some(t) if !plan.target_met => println!(
            "Next: {} ~{} ml ({} sips)",
            t.format("%H:%M"),
            plan.ml_per_reminder,
            plan.sips_per_reminder
        ),
        Some(t) => println!("Target met. Tomorrow starts {}", t.format("%a %H:%M")),
        None => println!("No upcoming reminders."),
    }
    Ok(())
}

fn insights(now: NaiveDateTime) -> Result<()> {
    let cfg = config::load_config()?;
    let history = state::read_history()?;
    let goal_ml = liters_to_ml(cfg.hydration.target_liters);
    let good_ml = good_threshold_ml(&cfg.hydration);

    let stats = compute_streak_stats(&history, now, goal_ml, good_ml, cfg.hydration.gentle_goal_enabled);
    println!("Current streak: {} days (best {})", stats.current_streak, stats.best_streak);
    println!("Goal hits: {} of last 7, {} of last 30", stats.last7_goal_hits, stats.last30_goal_hits);
    if let (Some(current), Some(best)) = (stats.current_good_streak, stats.best_good_streak) {
        println!("Good-day streak: {} (best {})", current, best);
    }

    let hours = compute_best_hours(&history, now, 30);
    if hours.is_empty() {
        println!("Best hours: not enough logs yet");
    } else {
        let labels: Vec<String> = hours.iter().map(|h| format!("{h:02}:00")).collect();
        println!("Best hours: {}", labels.join(", "));
    }
    Ok(())
}
