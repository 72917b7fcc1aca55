use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use siply_core::time::date_key;
use siply_core::{
    HandledCache, NotificationIntent, ScheduleStatus, compute_reminder_schedule,
    project_notifications,
};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use crate::config::load_config;
use crate::state::{notifications_dir, read_json, read_progress, write_json};

#[derive(Subcommand, Debug)]
pub enum NotifyCommand {
    /// Cancel every queued notification and queue a fresh schedule
    Reschedule,

    /// List queued notification intents
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Print due notifications that have not been delivered yet
    Dispatch {
        /// Show what would be delivered without recording it
        #[arg(long, default_value_t = false)]
        dry_run: bool,

        /// Max deliveries in one run (default from config.notifications.dispatch_limit)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show what the last reschedule did
    Diagnostics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduleDiagnostics {
    at: NaiveDateTime,
    recorded_at_utc: String,
    consumed_ml: i64,
    status: ScheduleStatus,
    slots: usize,
    queued: usize,
}

pub fn run(cmd: NotifyCommand, now: NaiveDateTime) -> Result<()> {
    match cmd {
        NotifyCommand::Reschedule => reschedule(now),
        NotifyCommand::List { limit } => list(limit),
        NotifyCommand::Dispatch { dry_run, limit } => dispatch(now, dry_run, limit),
        NotifyCommand::Diagnostics => diagnostics(),
    }
}

fn queue_path() -> Result<PathBuf> {
    Ok(notifications_dir()?.join("queue.jsonl"))
}

fn handled_path() -> Result<PathBuf> {
    Ok(notifications_dir()?.join("handled.json"))
}

fn diagnostics_path() -> Result<PathBuf> {
    Ok(notifications_dir()?.join("diagnostics.json"))
}

fn read_queue() -> Result<Vec<NotificationIntent>> {
    let q = queue_path()?;
    if !q.exists() {
        return Ok(Vec::new());
    }
    let f = fs::File::open(&q).with_context(|| format!("open {}", q.display()))?;
    let mut rows = Vec::new();
    for line in BufReader::new(f).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<NotificationIntent>(&line) {
            Ok(v) => rows.push(v),
            Err(e) => tracing::warn!("skipping unreadable queue line: {e}"),
        }
    }
    Ok(rows)
}

/// Drop everything queued. The schedule is always applied as a full replacement.
fn cancel_all() -> Result<usize> {
    let cancelled = read_queue()?.len();
    let q = queue_path()?;
    if q.exists() {
        fs::remove_file(&q).with_context(|| format!("remove {}", q.display()))?;
    }
    Ok(cancelled)
}

pub fn reschedule(now: NaiveDateTime) -> Result<()> {
    let cfg = load_config()?;
    let progress = read_progress(&date_key(now))?;
    let schedule = compute_reminder_schedule(now, &cfg.hydration, progress.consumed_ml);
    let intents = project_notifications(now, &cfg.hydration, &schedule);

    let cancelled = cancel_all()?;

    let q = queue_path()?;
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&q)
        .with_context(|| format!("open {}", q.display()))?;
    for intent in &intents {
        writeln!(f, "{}", serde_json::to_string(intent)?)?;
    }

    let diag = ScheduleDiagnostics {
        at: now,
        recorded_at_utc: Utc::now().to_rfc3339(),
        consumed_ml: progress.consumed_ml,
        status: schedule.status,
        slots: schedule.slots.len(),
        queued: intents.len(),
    };
    write_json(&diagnostics_path()?, &diag)?;

    tracing::info!(cancelled, queued = intents.len(), "notifications rescheduled");
    println!(
        "Cancelled {} and queued {} notifications ({} reminders) in {}",
        cancelled,
        intents.len(),
        schedule.slots.len(),
        q.display()
    );
    Ok(())
}

fn list(limit: usize) -> Result<()> {
    let rows = read_queue()?;
    if rows.is_empty() {
        println!("No notifications queued.");
        return Ok(());
    }
    for (i, n) in rows.iter().take(limit).enumerate() {
        println!(
            "{}. {} [{:?}] {}",
            i + 1,
            n.fire_at.format("%Y-%m-%d %H:%M"),
            n.kind,
            n.body
        );
    }
    if rows.len() > limit {
        println!("... {} more", rows.len() - limit);
    }
    Ok(())
}

fn dispatch(now: NaiveDateTime, dry_run: bool, limit: Option<usize>) -> Result<()> {
    let cfg = load_config()?;
    let resolved_limit = limit.unwrap_or(cfg.notifications.dispatch_limit);
    let ttl_minutes = cfg.notifications.handled_ttl_hours.saturating_mul(60);

    let hp = handled_path()?;
    let mut handled =
        read_json::<HandledCache>(&hp)?.unwrap_or_else(|| HandledCache::new(ttl_minutes));
    handled.ttl_minutes = ttl_minutes;
    let pruned = handled.prune(now);
    if pruned > 0 {
        tracing::debug!(pruned, "expired handled ids");
    }

    let due: Vec<NotificationIntent> = read_queue()?
        .into_iter()
        .filter(|n| n.fire_at <= now && !handled.is_handled(&n.id, now))
        .collect();

    if due.is_empty() {
        println!("No due notifications.");
        return Ok(());
    }

    let mut delivered = 0usize;
    for n in due.into_iter().take(resolved_limit) {
        if dry_run {
            println!("[DRY RUN] would deliver {} {}: {}", n.fire_at.format("%H:%M"), n.title, n.body);
            continue;
        }
        println!("{} {}: {}", n.fire_at.format("%H:%M"), n.title, n.body);
        handled.mark(n.id, now);
        delivered += 1;
    }

    if !dry_run {
        write_json(&hp, &handled)?;
    }
    println!("Dispatch complete. Delivered {} notifications.", delivered);
    Ok(())
}

fn diagnostics() -> Result<()> {
    match read_json::<ScheduleDiagnostics>(&diagnostics_path()?)? {
        Some(d) => println!("{}", serde_json::to_string_pretty(&d)?),
        None => println!("No reschedule recorded yet. Run: siply notify reschedule"),
    }
    Ok(())
}
