//! Reminder schedule builder.
//!
//! `compute_reminder_schedule` is a pure function of `(now, settings, consumed_ml)`.
//! It walks the resolved window spans in order, asks the allocation algorithm
//! for a plan per span and lays the plan out as concrete reminder slots within
//! a 24 hour horizon. It never fails: problems come back as a status.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::calculations::{
    compute_auto_plan, compute_sips_per_reminder, get_window_minutes, liters_to_ml, AutoPlanInput,
};
use crate::constants::{
    HORIZON_MINUTES, MAX_GENERATION_ITERATIONS, MAX_NOTIFICATIONS_PER_DAY, MIN_INTERVAL_MINUTES,
    NUDGE_MINUTES, REMINDER_TARGET_ML,
};
use crate::settings::Settings;
use crate::time::{add_minutes, minutes_until_ceil};
use crate::window::{resolve_windows, WindowSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    Success,
    NoWindow,
    TargetMet,
    ConfigError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSlot {
    pub time: NaiveDateTime,
    pub ml_per_reminder: i64,
    pub sips_per_reminder: i64,
    /// Spacing used for this slot's window; 0 for a last-minute catch-up slot.
    pub interval_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    pub slots: Vec<ReminderSlot>,
    pub target_met: bool,
    pub status: ScheduleStatus,
}

impl ScheduleResult {
    fn empty(status: ScheduleStatus) -> Self {
        Self {
            slots: Vec::new(),
            target_met: false,
            status,
        }
    }

    pub fn next_slot(&self) -> Option<&ReminderSlot> {
        self.slots.first()
    }
}

/// Daily cap on base reminders, leaving room for the nudges attached to each.
pub fn max_base_reminders(settings: &Settings) -> i64 {
    let factor = if settings.escalation_enabled {
        1 + NUDGE_MINUTES.len() as i64
    } else {
        1
    };
    (MAX_NOTIFICATIONS_PER_DAY / factor).max(1)
}

/// Step from `start` towards `end` at `interval_minutes`, at most `max_count` times.
pub(crate) fn build_window_times(
    start: NaiveDateTime,
    end: NaiveDateTime,
    interval_minutes: i64,
    max_count: usize,
) -> Vec<NaiveDateTime> {
    let mut times = Vec::new();
    if end <= start || interval_minutes <= 0 {
        return times;
    }

    let max_iterations = max_count.min(MAX_GENERATION_ITERATIONS);
    let mut current = start;
    for _ in 0..max_iterations {
        if current >= end {
            break;
        }
        times.push(current);
        let next = add_minutes(current, interval_minutes);
        if next <= current {
            tracing::warn!(
                interval_minutes,
                at = %current,
                "reminder generation stalled; stopping for this window"
            );
            break;
        }
        current = next;
    }
    times
}

fn build_slots(
    times: &[NaiveDateTime],
    ml_per_reminder: i64,
    interval_minutes: i64,
    sip_ml: i64,
) -> Vec<ReminderSlot> {
    let sips = compute_sips_per_reminder(ml_per_reminder, sip_ml);
    times
        .iter()
        .map(|&time| ReminderSlot {
            time,
            ml_per_reminder,
            sips_per_reminder: sips,
            interval_minutes,
        })
        .collect()
}

/// Slots contributed by a single window span, given the capacity still left.
fn slots_for_span(
    span: &WindowSpan,
    now: NaiveDateTime,
    settings: &Settings,
    target_ml: i64,
    consumed_ml: i64,
    capacity: i64,
) -> Vec<ReminderSlot> {
    let window_minutes_total = get_window_minutes(settings);
    let is_current = span.contains(now);

    let remaining_ml = if is_current {
        target_ml.saturating_sub(consumed_ml).max(0)
    } else {
        target_ml
    };
    if remaining_ml <= 0 {
        tracing::debug!(start = %span.start, "target already met for current window");
        return Vec::new();
    }

    let window_minutes = if is_current {
        minutes_until_ceil(now, span.end)
    } else {
        window_minutes_total
    };

    let plan = compute_auto_plan(AutoPlanInput {
        remaining_ml,
        window_minutes,
        min_interval_minutes: MIN_INTERVAL_MINUTES,
        max_reminders: capacity,
        desired_reminder_ml: REMINDER_TARGET_ML,
    });
    let Some(plan) = plan.filter(|p| p.ml_per_reminder > 0 && p.interval_minutes > 0) else {
        tracing::debug!(start = %span.start, window_minutes, "no feasible plan for window");
        return Vec::new();
    };
    tracing::debug!(
        start = %span.start,
        is_current,
        remaining_ml,
        interval = plan.interval_minutes,
        reminders = plan.reminders,
        "planned window"
    );

    let span_minutes = minutes_until_ceil(span.start, span.end);
    let max_window_slots = ((span_minutes + plan.interval_minutes - 1) / plan.interval_minutes).max(1);
    let planned = build_window_times(
        span.start,
        span.end,
        plan.interval_minutes,
        max_window_slots as usize,
    );
    let times: Vec<NaiveDateTime> = planned
        .into_iter()
        .filter(|t| *t > now)
        .take(capacity as usize)
        .collect();

    if times.is_empty() {
        if is_current && window_minutes > 0 {
            // Last stretch of the window: one catch-up reminder for everything left.
            let immediate = add_minutes(now, 1);
            if immediate < span.end {
                let ml = remaining_ml.max(1);
                return vec![ReminderSlot {
                    time: immediate,
                    ml_per_reminder: ml,
                    sips_per_reminder: compute_sips_per_reminder(ml, settings.sip_ml),
                    interval_minutes: 0,
                }];
            }
        }
        return Vec::new();
    }

    let ml_per_reminder = ((remaining_ml as f64 / times.len() as f64).round() as i64).max(1);
    let horizon_end = add_minutes(now, HORIZON_MINUTES);
    let within_horizon: Vec<NaiveDateTime> =
        times.into_iter().filter(|t| *t <= horizon_end).collect();

    build_slots(&within_horizon, ml_per_reminder, plan.interval_minutes, settings.sip_ml)
}

/// Keep the first slot for each time, preserving order.
fn dedupe_by_time(mut slots: Vec<ReminderSlot>) -> Vec<ReminderSlot> {
    let mut seen = HashSet::new();
    slots.retain(|slot| seen.insert(slot.time));
    slots
}

/// Compute upcoming reminder slots for the next 24 hours.
pub fn compute_reminder_schedule(
    now: NaiveDateTime,
    settings: &Settings,
    consumed_ml: i64,
) -> ScheduleResult {
    if settings.sip_ml <= 0 || settings.target_liters.is_nan() || settings.target_liters <= 0.0 {
        return ScheduleResult::empty(ScheduleStatus::ConfigError);
    }
    if get_window_minutes(settings) <= 0 {
        return ScheduleResult::empty(ScheduleStatus::NoWindow);
    }

    let target_ml = liters_to_ml(settings.target_liters);
    let target_met = consumed_ml >= target_ml;
    let max_base = max_base_reminders(settings);

    let mut slots: Vec<ReminderSlot> = Vec::new();
    for span in resolve_windows(now, settings) {
        let capacity = max_base - slots.len() as i64;
        if capacity <= 0 {
            break;
        }
        slots.extend(slots_for_span(&span, now, settings, target_ml, consumed_ml, capacity));
    }

    ScheduleResult {
        slots: dedupe_by_time(slots),
        target_met,
        status: if target_met {
            ScheduleStatus::TargetMet
        } else {
            ScheduleStatus::Success
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn day_settings() -> Settings {
        Settings::default()
            .with_target_liters(2.0)
            .with_window("08:00", "20:00")
            .with_sip_ml(15)
            .with_escalation(false)
    }

    #[test]
    fn duplicate_times_keep_first_slot() {
        let first = ReminderSlot {
            time: at(14, 9, 0),
            ml_per_reminder: 250,
            sips_per_reminder: 17,
            interval_minutes: 60,
        };
        let later = ReminderSlot {
            time: at(14, 10, 0),
            ..first.clone()
        };
        let repeat = ReminderSlot {
            ml_per_reminder: 500,
            ..first.clone()
        };
        let out = dedupe_by_time(vec![first.clone(), later.clone(), repeat, later.clone()]);
        assert_eq!(out, vec![first, later]);
    }

    #[test]
    fn oversized_target_does_not_overflow() {
        let settings = day_settings().with_target_liters(1e16);
        let result = compute_reminder_schedule(at(14, 7, 0), &settings, 0);
        assert_eq!(result.status, ScheduleStatus::Success);
        assert!(!result.slots.is_empty());
        assert!(result.slots.iter().all(|s| s.ml_per_reminder > 0));
    }

    #[test]
    fn config_errors() {
        let r = compute_reminder_schedule(at(14, 9, 0), &day_settings().with_sip_ml(0), 0);
        assert_eq!(r.status, ScheduleStatus::ConfigError);
        assert!(r.slots.is_empty());

        let r = compute_reminder_schedule(at(14, 9, 0), &day_settings().with_target_liters(0.0), 0);
        assert_eq!(r.status, ScheduleStatus::ConfigError);
        assert!(!r.target_met);
    }

    #[test]
    fn zero_length_window() {
        let s = day_settings().with_window("09:00", "09:00");
        let r = compute_reminder_schedule(at(14, 9, 0), &s, 0);
        assert_eq!(r.status, ScheduleStatus::NoWindow);
        assert!(r.slots.is_empty());
    }

    #[test]
    fn base_cap_reserves_room_for_nudges() {
        assert_eq!(max_base_reminders(&day_settings()), 48);
        assert_eq!(max_base_reminders(&day_settings().with_escalation(true)), 16);
    }

    #[test]
    fn window_times_stop_at_end() {
        let times = build_window_times(at(14, 8, 0), at(14, 10, 0), 45, 10);
        assert_eq!(times, vec![at(14, 8, 0), at(14, 8, 45), at(14, 9, 30)]);
    }

    #[test]
    fn window_times_reject_non_advancing_interval() {
        assert!(build_window_times(at(14, 8, 0), at(14, 10, 0), 0, 10).is_empty());
        assert!(build_window_times(at(14, 8, 0), at(14, 10, 0), -5, 10).is_empty());
    }

    #[test]
    fn window_times_terminate_for_every_interval() {
        let start = at(14, 0, 0);
        let end = at(15, 0, 0);
        for interval in 1..=1440 {
            let times = build_window_times(start, end, interval, usize::MAX);
            assert!(times.len() <= MAX_GENERATION_ITERATIONS);
            assert!(times.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn last_minutes_of_window_get_catch_up_slot() {
        // 19:45 with 20:00 end: the 90 minute grid has nothing left, so one
        // slot a minute from now carries everything remaining.
        let r = compute_reminder_schedule(at(14, 19, 45), &day_settings(), 1500);
        let first = r.next_slot().unwrap();
        assert_eq!(first.time, at(14, 19, 46));
        assert_eq!(first.ml_per_reminder, 500);
        assert_eq!(first.sips_per_reminder, 33);
        assert_eq!(first.interval_minutes, 0);
    }

    #[test]
    fn no_catch_up_when_window_ends_within_a_minute() {
        let now = at(14, 19, 59);
        let r = compute_reminder_schedule(now, &day_settings(), 1500);
        assert!(r.slots.iter().all(|s| s.time >= at(15, 8, 0)));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ScheduleStatus::ConfigError).unwrap();
        assert_eq!(json, "\"config_error\"");
    }
}
