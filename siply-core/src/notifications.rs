//! Project a computed schedule into notification intents (base + nudges).
//!
//! Delivery is someone else's job: the sink cancels everything it has queued
//! and applies this list as a full replacement.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, HORIZON_MINUTES, NUDGE_MINUTES};
use crate::schedule::{max_base_reminders, ScheduleResult};
use crate::settings::Settings;
use crate::time::add_minutes;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reminder,
    Nudge,
    FinalNudge,
}

impl NotificationKind {
    fn label(self) -> &'static str {
        match self {
            NotificationKind::Reminder => "reminder",
            NotificationKind::Nudge => "nudge",
            NotificationKind::FinalNudge => "final-nudge",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationIntent {
    /// Stable per fire time and kind, so a recomputed schedule reuses ids.
    pub id: String,
    pub kind: NotificationKind,
    pub fire_at: NaiveDateTime,
    pub title: String,
    pub body: String,
    pub ml: i64,
    pub sound: bool,
}

pub fn format_reminder_body(ml: i64, sips: i64) -> String {
    format!("Drink ~{ml} ml ({sips} sips)")
}

fn format_nudge_body(ml: i64, sips: i64) -> String {
    format!("Reminder: ~{ml} ml ({sips} sips)")
}

fn format_final_nudge_body(ml: i64) -> String {
    format!("Still time for ~{ml} ml")
}

fn intent(kind: NotificationKind, fire_at: NaiveDateTime, body: String, ml: i64, sound: bool) -> NotificationIntent {
    NotificationIntent {
        id: format!("{}-{}", kind.label(), fire_at.and_utc().timestamp()),
        kind,
        fire_at,
        title: APP_NAME.to_string(),
        body,
        ml,
        sound,
    }
}

/// Deterministically expand schedule slots into notification intents.
///
/// Base reminders are capped at the escalation-adjusted daily limit. When
/// escalation is on, each base reminder gets one nudge per `NUDGE_MINUTES`
/// offset; nudges past the 24 hour horizon are dropped.
pub fn project_notifications(
    now: NaiveDateTime,
    settings: &Settings,
    schedule: &ScheduleResult,
) -> Vec<NotificationIntent> {
    let max_base = max_base_reminders(settings).max(0) as usize;
    let horizon_end = add_minutes(now, HORIZON_MINUTES);

    let mut out = Vec::new();
    for slot in schedule.slots.iter().take(max_base) {
        out.push(intent(
            NotificationKind::Reminder,
            slot.time,
            format_reminder_body(slot.ml_per_reminder, slot.sips_per_reminder),
            slot.ml_per_reminder,
            settings.sound_enabled,
        ));

        if !settings.escalation_enabled {
            continue;
        }
        for (i, offset) in NUDGE_MINUTES.iter().enumerate() {
            let fire_at = add_minutes(slot.time, *offset);
            if fire_at > horizon_end {
                continue;
            }
            let (kind, body) = if i == 0 {
                (
                    NotificationKind::Nudge,
                    format_nudge_body(slot.ml_per_reminder, slot.sips_per_reminder),
                )
            } else {
                (
                    NotificationKind::FinalNudge,
                    format_final_nudge_body(slot.ml_per_reminder),
                )
            };
            out.push(intent(kind, fire_at, body, slot.ml_per_reminder, settings.sound_enabled));
        }
    }

    out.sort_by_key(|n| n.fire_at);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{ReminderSlot, ScheduleStatus};
    use chrono::NaiveDate;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn schedule(times: &[NaiveDateTime]) -> ScheduleResult {
        ScheduleResult {
            slots: times
                .iter()
                .map(|&time| ReminderSlot {
                    time,
                    ml_per_reminder: 250,
                    sips_per_reminder: 17,
                    interval_minutes: 90,
                })
                .collect(),
            target_met: false,
            status: ScheduleStatus::Success,
        }
    }

    #[test]
    fn base_only_without_escalation() {
        let settings = Settings::default().with_escalation(false);
        let out = project_notifications(at(14, 8, 0), &settings, &schedule(&[at(14, 9, 0)]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].body, "Drink ~250 ml (17 sips)");
        assert_eq!(out[0].kind, NotificationKind::Reminder);
    }

    #[test]
    fn escalation_adds_two_nudges() {
        let settings = Settings::default().with_escalation(true);
        let out = project_notifications(at(14, 8, 0), &settings, &schedule(&[at(14, 9, 0)]));
        let kinds: Vec<_> = out.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NotificationKind::Reminder, NotificationKind::Nudge, NotificationKind::FinalNudge]
        );
        assert_eq!(out[1].fire_at, at(14, 9, 5));
        assert_eq!(out[2].body, "Still time for ~250 ml");
    }

    #[test]
    fn nudges_past_horizon_are_dropped() {
        let settings = Settings::default().with_escalation(true);
        // Base at exactly now + 24h; both nudges would land beyond it.
        let out = project_notifications(at(14, 8, 0), &settings, &schedule(&[at(15, 8, 0)]));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn base_count_capped() {
        let settings = Settings::default().with_escalation(true);
        let times: Vec<_> = (0..20).map(|i| at(14, 0, 0) + chrono::Duration::minutes(30 * i)).collect();
        let out = project_notifications(at(13, 23, 0), &settings, &schedule(&times));
        let bases = out.iter().filter(|n| n.kind == NotificationKind::Reminder).count();
        assert_eq!(bases, 16);
    }

    #[test]
    fn ids_are_deterministic() {
        let settings = Settings::default();
        let s = schedule(&[at(14, 9, 0)]);
        assert_eq!(
            project_notifications(at(14, 8, 0), &settings, &s),
            project_notifications(at(14, 8, 0), &settings, &s)
        );
    }
}
