//! Per-day intake history, streaks and logging-hour insights.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::calculations::liters_to_ml;
use crate::constants::HISTORY_RETENTION_DAYS;
use crate::settings::Settings;
use crate::time::{add_days, date_key};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: String,
    #[serde(default)]
    pub total_ml: i64,
    #[serde(default)]
    pub goal_ml: i64,
    #[serde(default)]
    pub good_threshold_ml: i64,
    /// Number of logs per local hour.
    #[serde(default)]
    pub log_hours: [u32; 24],
}

impl DaySummary {
    pub fn empty(date: impl Into<String>, goal_ml: i64, good_threshold_ml: i64) -> Self {
        Self {
            date: date.into(),
            total_ml: 0,
            goal_ml,
            good_threshold_ml,
            log_hours: [0; 24],
        }
    }

    pub fn goal_hit(&self) -> bool {
        self.goal_ml > 0 && self.total_ml >= self.goal_ml
    }

    pub fn good_hit(&self) -> bool {
        self.good_threshold_ml > 0 && self.total_ml >= self.good_threshold_ml
    }
}

/// Keyed by "YYYY-MM-DD"; keys sort chronologically.
pub type History = BTreeMap<String, DaySummary>;

/// Volume that counts as a "good" day under the gentle goal.
pub fn good_threshold_ml(settings: &Settings) -> i64 {
    let goal = liters_to_ml(settings.target_liters) as f64;
    (goal * settings.gentle_goal_threshold as f64 / 100.0).round() as i64
}

/// Record a drink at `now`. Non-positive amounts leave history untouched.
pub fn update_history_for_log(
    history: &mut History,
    now: NaiveDateTime,
    amount_ml: i64,
    goal_ml: i64,
    good_threshold_ml: i64,
) {
    if amount_ml <= 0 {
        return;
    }
    let key = date_key(now);
    let entry = history
        .entry(key.clone())
        .or_insert_with(|| DaySummary::empty(key, goal_ml, good_threshold_ml));
    let hour = &mut entry.log_hours[now.hour() as usize];
    *hour = hour.saturating_add(1);
    entry.total_ml = entry.total_ml.saturating_add(amount_ml).max(0);
    entry.goal_ml = goal_ml;
    entry.good_threshold_ml = good_threshold_ml;
}

pub fn reset_history_for_date(history: &mut History, key: &str, goal_ml: i64, good_threshold_ml: i64) {
    history.insert(key.to_string(), DaySummary::empty(key, goal_ml, good_threshold_ml));
}

/// Drop days older than the retention window (today counts as day one).
pub fn trim_history(history: &mut History, now: NaiveDateTime, retention_days: i64) {
    let cutoff = date_key(add_days(now, -retention_days.max(1) + 1));
    history.retain(|key, _| key.as_str() >= cutoff.as_str());
}

/// The last `days` date keys, oldest first, ending with today.
pub fn build_date_keys(today: NaiveDateTime, days: i64) -> Vec<String> {
    (0..days.max(0))
        .map(|i| date_key(add_days(today, -(days - 1 - i))))
        .collect()
}

pub fn summary_for_date(
    history: &History,
    key: &str,
    fallback_goal_ml: i64,
    fallback_good_threshold_ml: i64,
) -> DaySummary {
    history
        .get(key)
        .cloned()
        .unwrap_or_else(|| DaySummary::empty(key, fallback_goal_ml, fallback_good_threshold_ml))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakStats {
    pub current_streak: u32,
    pub best_streak: u32,
    pub last7_goal_hits: u32,
    pub last30_goal_hits: u32,
    /// Only tracked while the gentle goal is enabled.
    pub current_good_streak: Option<u32>,
    pub best_good_streak: Option<u32>,
}

fn best_run(flags: &[bool]) -> u32 {
    let mut best = 0;
    let mut current = 0;
    for &hit in flags {
        if hit {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

fn trailing_run(flags: &[bool]) -> u32 {
    flags.iter().rev().take_while(|&&hit| hit).count() as u32
}

pub fn compute_streak_stats(
    history: &History,
    now: NaiveDateTime,
    fallback_goal_ml: i64,
    fallback_good_threshold_ml: i64,
    gentle_enabled: bool,
) -> StreakStats {
    let days: Vec<DaySummary> = build_date_keys(now, HISTORY_RETENTION_DAYS)
        .iter()
        .map(|key| summary_for_date(history, key, fallback_goal_ml, fallback_good_threshold_ml))
        .collect();
    let goal_flags: Vec<bool> = days.iter().map(DaySummary::goal_hit).collect();
    let good_flags: Vec<bool> = days.iter().map(DaySummary::good_hit).collect();

    let hits_in_last = |n: usize| {
        goal_flags
            .iter()
            .rev()
            .take(n)
            .filter(|&&hit| hit)
            .count() as u32
    };

    StreakStats {
        current_streak: trailing_run(&goal_flags),
        best_streak: best_run(&goal_flags),
        last7_goal_hits: hits_in_last(7),
        last30_goal_hits: hits_in_last(30),
        current_good_streak: gentle_enabled.then(|| trailing_run(&good_flags)),
        best_good_streak: gentle_enabled.then(|| best_run(&good_flags)),
    }
}

/// Up to three hours of the day with the most logs over the last `days` days.
pub fn compute_best_hours(history: &History, now: NaiveDateTime, days: i64) -> Vec<u32> {
    let mut counts = [0u32; 24];
    for key in build_date_keys(now, days) {
        if let Some(entry) = history.get(&key) {
            for (hour, n) in entry.log_hours.iter().enumerate() {
                counts[hour] += n;
            }
        }
    }

    let mut ranked: Vec<(u32, u32)> = counts
        .iter()
        .enumerate()
        .filter(|(_, n)| **n > 0)
        .map(|(hour, n)| (hour as u32, *n))
        .collect();
    // Stable sort keeps earlier hours first on ties.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(3).map(|(hour, _)| hour).collect()
}
