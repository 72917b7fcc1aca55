use chrono::{Duration, NaiveDate, NaiveDateTime};
use siply_core::time::parse_time_to_minutes;
use siply_core::{
    compute_auto_plan, compute_reminder_schedule, get_window_minutes, liters_to_ml,
    max_base_reminders, project_notifications, AutoPlanInput, ScheduleStatus, Settings,
};

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
fn window_lengths() {
    let s = Settings::default();
    assert_eq!(get_window_minutes(&s.clone().with_window("07:00", "23:00")), 960);
    assert_eq!(get_window_minutes(&s.clone().with_window("23:00", "07:00")), 480);
    assert_eq!(get_window_minutes(&s.with_window("07:00", "07:00")), 0);
}

#[test]
fn strict_time_parsing() {
    assert_eq!(parse_time_to_minutes("24:00"), None);
    assert_eq!(parse_time_to_minutes("07:00"), Some(420));
}

#[test]
fn short_window_allocation() {
    let plan = compute_auto_plan(AutoPlanInput {
        remaining_ml: 100,
        window_minutes: 30,
        min_interval_minutes: 30,
        max_reminders: 5,
        desired_reminder_ml: 200,
    })
    .unwrap();
    assert_eq!(plan.reminders, 1);
    assert_eq!(plan.ml_per_reminder, 100);
    assert_eq!(plan.interval_minutes, 30);
}

/// Day window, nothing drunk yet, computed right as the window opens.
#[test]
fn fresh_day_spreads_target_evenly() {
    let now = at(14, 8, 0);
    let r = compute_reminder_schedule(now, &day_settings(), 0);
    assert_eq!(r.status, ScheduleStatus::Success);
    assert!(!r.target_met);

    let today: Vec<_> = r.slots.iter().filter(|s| s.time < at(14, 20, 0)).collect();
    assert!(today.len() > 1);
    assert!(today[0].time >= now);

    let total: i64 = today.iter().map(|s| s.ml_per_reminder).sum();
    assert!((total - 2000).abs() <= today.len() as i64, "total {total}");

    let gaps: Vec<_> = today.windows(2).map(|w| w[1].time - w[0].time).collect();
    assert!(gaps.iter().all(|g| *g == gaps[0]));
    assert_eq!(gaps[0], Duration::minutes(today[0].interval_minutes));
}

/// Goal met mid-window: nothing more today, tomorrow still planned.
#[test]
fn met_target_skips_current_window() {
    let now = at(14, 10, 0);
    let r = compute_reminder_schedule(now, &day_settings(), 2000);
    assert!(r.target_met);
    assert_eq!(r.status, ScheduleStatus::TargetMet);
    assert!(r.slots.iter().all(|s| s.time >= at(15, 8, 0)));
    assert!(!r.slots.is_empty());
}

/// Overnight window entered before midnight counts down to 07:00 tomorrow.
#[test]
fn overnight_window_in_progress() {
    let settings = day_settings().with_window("23:00", "07:00");
    let now = at(14, 23, 30);
    let r = compute_reminder_schedule(now, &settings, 0);

    let tonight: Vec<_> = r.slots.iter().filter(|s| s.time < at(15, 7, 0)).collect();
    assert!(tonight.len() > 1);
    assert!(tonight[0].time > now);
    // 450 minutes remain: 2000 ml at 250 ml wants 8 reminders, 56 minutes apart.
    assert_eq!(tonight[0].interval_minutes, 56);
    assert!(tonight.iter().any(|s| s.time > at(15, 0, 0)));
}

#[test]
fn escalation_caps_base_reminders() {
    let settings = Settings::default()
        .with_target_liters(10.0)
        .with_window("00:00", "23:59")
        .with_escalation(true);
    let now = at(14, 0, 0);
    let r = compute_reminder_schedule(now, &settings, 0);
    assert_eq!(max_base_reminders(&settings), 16);
    assert_eq!(r.slots.len(), 16);

    let intents = project_notifications(now, &settings, &r);
    assert!(intents.len() <= 48);
    assert_eq!(intents.len(), 16 * 3);
}

#[test]
fn schedule_properties_hold_across_the_clock() {
    let settings_grid = vec![
        day_settings(),
        day_settings().with_window("23:00", "07:00"),
        day_settings().with_window("06:30", "06:00"),
        day_settings().with_escalation(true),
        day_settings().with_target_liters(0.1),
        Settings::default(),
    ];

    for settings in &settings_grid {
        let max_base = max_base_reminders(settings) as usize;
        let target_ml = liters_to_ml(settings.target_liters);
        for consumed in [0, 500, 5000] {
            let mut now = at(13, 0, 7);
            while now < at(16, 0, 0) {
                let r = compute_reminder_schedule(now, settings, consumed);
                let horizon = now + Duration::hours(24);

                assert!(r.slots.len() <= max_base);
                assert_eq!(r.target_met, consumed >= target_ml);
                for w in r.slots.windows(2) {
                    assert!(w[0].time < w[1].time, "unsorted at {now}");
                }
                for s in &r.slots {
                    assert!(s.time > now && s.time <= horizon, "{} outside horizon at {now}", s.time);
                    assert!(s.ml_per_reminder >= 1);
                    assert!(s.sips_per_reminder >= 1);
                }
                assert_eq!(r, compute_reminder_schedule(now, settings, consumed));

                now += Duration::minutes(37);
            }
        }
    }
}

#[test]
fn result_serializes_for_the_sink() {
    let r = compute_reminder_schedule(at(14, 8, 0), &day_settings(), 0);
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["slots"][0]["time"], "2026-03-14T09:30:00");
}
