//! Scheduling constants shared by the engine, the plan summary and the CLI.

pub const APP_NAME: &str = "Siply";

/// Reminders are never spaced closer than this.
pub const MIN_INTERVAL_MINUTES: i64 = 30;

/// Upper bound on notifications (base reminders plus nudges) per 24 hours.
pub const MAX_NOTIFICATIONS_PER_DAY: i64 = 48;

/// Escalation offsets, in minutes after each base reminder.
pub const NUDGE_MINUTES: [i64; 2] = [5, 10];

/// Preferred volume per reminder; biases interval choice only.
pub const REMINDER_TARGET_ML: i64 = 250;

/// Largest daily target accepted from settings.
pub const MAX_TARGET_LITERS: f64 = 20.0;

pub const HISTORY_RETENTION_DAYS: i64 = 60;

pub const DEFAULT_GENTLE_GOAL_THRESHOLD: i64 = 70;

/// Bounds on the quick-log preset list.
pub const QUICK_LOG_MIN_PRESETS: usize = 2;
pub const QUICK_LOG_MAX_PRESETS: usize = 6;

pub const DEFAULT_QUICK_LOG_PRESETS: [i64; 4] = [150, 250, 350, 500];

pub const MINUTES_IN_DAY: i64 = 24 * 60;

/// Look-ahead covered by one schedule computation.
pub const HORIZON_MINUTES: i64 = MINUTES_IN_DAY;

/// Guard against candidate generation that never advances.
pub const MAX_GENERATION_ITERATIONS: usize = 1000;
