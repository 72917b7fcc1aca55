//! Volume arithmetic and the per-window allocation algorithm.

use serde::{Deserialize, Serialize};

use crate::constants::MINUTES_IN_DAY;
use crate::settings::Settings;
use crate::time::parse_time_to_minutes;

pub fn liters_to_ml(liters: f64) -> i64 {
    (liters * 1000.0).round() as i64
}

/// Length of the daily window in minutes.
///
/// An end before the start wraps past midnight; equal bounds give an empty window.
pub fn get_window_minutes(settings: &Settings) -> i64 {
    let start = parse_time_to_minutes(&settings.window_start).unwrap_or(0);
    let end = parse_time_to_minutes(&settings.window_end).unwrap_or(0);
    if end > start {
        end - start
    } else if end == start {
        0
    } else {
        (MINUTES_IN_DAY - start) + end
    }
}

pub fn compute_sips_per_reminder(ml_per_reminder: i64, sip_ml: i64) -> i64 {
    if sip_ml <= 0 {
        return 1;
    }
    ((ml_per_reminder as f64 / sip_ml as f64).round() as i64).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoPlanInput {
    pub remaining_ml: i64,
    pub window_minutes: i64,
    pub min_interval_minutes: i64,
    pub max_reminders: i64,
    /// Preferred dose per reminder. Biases the reminder count, never enforced.
    pub desired_reminder_ml: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoPlan {
    pub interval_minutes: i64,
    pub reminders: i64,
    pub ml_per_reminder: i64,
}

/// Decide how many reminders fit into a window and how much each carries.
///
/// Prefers fewer, larger reminders (close to `desired_reminder_ml`) unless the
/// volume forces more, while never spacing them closer than
/// `min_interval_minutes` or exceeding `max_reminders`.
pub fn compute_auto_plan(input: AutoPlanInput) -> Option<AutoPlan> {
    let AutoPlanInput {
        remaining_ml,
        window_minutes,
        min_interval_minutes,
        max_reminders,
        desired_reminder_ml,
    } = input;

    if remaining_ml <= 0 || window_minutes <= 0 {
        return None;
    }

    let min_interval = min_interval_minutes.max(1);
    let desired_ml = desired_reminder_ml.max(1);

    let max_by_interval = (window_minutes / min_interval).max(1);
    let allowed = max_reminders.min(max_by_interval);
    if allowed <= 0 {
        return None;
    }

    // remaining_ml > 0, so this ceil cannot overflow near i64::MAX.
    let desired = ((remaining_ml - 1) / desired_ml + 1).max(1);
    let initial = allowed.min(desired);

    let interval_minutes = min_interval_minutes.max(window_minutes / initial);
    if interval_minutes <= 0 {
        return None;
    }

    // The interval may have been raised to the floor; recount what fits.
    let adjusted = (window_minutes / interval_minutes).max(1);
    let reminders = allowed.min(adjusted);

    let ml_per_reminder = ((remaining_ml as f64 / reminders as f64).round() as i64).max(1);

    Some(AutoPlan {
        interval_minutes,
        reminders,
        ml_per_reminder,
    })
}
