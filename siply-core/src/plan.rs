//! At-a-glance hydration plan for today.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::calculations::{
    compute_auto_plan, compute_sips_per_reminder, get_window_minutes, liters_to_ml, AutoPlanInput,
};
use crate::constants::{MIN_INTERVAL_MINUTES, REMINDER_TARGET_ML};
use crate::schedule::{compute_reminder_schedule, max_base_reminders, ScheduleStatus};
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrationPlan {
    pub target_ml: i64,
    pub consumed_ml: i64,
    pub reminders_per_day: i64,
    pub ml_per_reminder: i64,
    pub sips_per_reminder: i64,
    pub next_reminder_at: Option<NaiveDateTime>,
    pub target_met: bool,
    pub status: ScheduleStatus,
}

/// Summarise the schedule for display.
///
/// Per-reminder figures come from the next scheduled slot; when there is
/// none, a whole-window plan for the remaining volume fills in.
pub fn compute_hydration_plan(now: NaiveDateTime, settings: &Settings, consumed_ml: i64) -> HydrationPlan {
    let target_ml = liters_to_ml(settings.target_liters);
    let schedule = compute_reminder_schedule(now, settings, consumed_ml);
    let next = schedule.next_slot();

    let fallback = compute_auto_plan(AutoPlanInput {
        remaining_ml: target_ml.saturating_sub(consumed_ml).max(0),
        window_minutes: get_window_minutes(settings),
        min_interval_minutes: MIN_INTERVAL_MINUTES,
        max_reminders: max_base_reminders(settings),
        desired_reminder_ml: REMINDER_TARGET_ML,
    });
    let fallback_ml = fallback.map(|p| p.ml_per_reminder).unwrap_or(REMINDER_TARGET_ML);

    HydrationPlan {
        target_ml,
        consumed_ml,
        reminders_per_day: fallback
            .map(|p| p.reminders)
            .unwrap_or(schedule.slots.len() as i64),
        ml_per_reminder: next.map(|s| s.ml_per_reminder).unwrap_or(fallback_ml),
        sips_per_reminder: next
            .map(|s| s.sips_per_reminder)
            .unwrap_or_else(|| compute_sips_per_reminder(fallback_ml, settings.sip_ml)),
        next_reminder_at: next.map(|s| s.time),
        target_met: schedule.target_met,
        status: schedule.status,
    }
}
