//! siply-core: hydration reminder scheduling engine and daily intake bookkeeping.

pub mod calculations;
pub mod constants;
pub mod handled;
pub mod history;
pub mod notifications;
pub mod plan;
pub mod progress;
pub mod quick_log;
pub mod schedule;
pub mod settings;
pub mod time;
pub mod window;

pub use calculations::{
    compute_auto_plan, compute_sips_per_reminder, get_window_minutes, liters_to_ml, AutoPlan,
    AutoPlanInput,
};
pub use handled::HandledCache;
pub use history::{
    compute_best_hours, compute_streak_stats, good_threshold_ml, reset_history_for_date,
    summary_for_date, trim_history, update_history_for_log, DaySummary, History, StreakStats,
};
pub use notifications::{project_notifications, NotificationIntent, NotificationKind};
pub use plan::{compute_hydration_plan, HydrationPlan};
pub use progress::Progress;
pub use quick_log::{normalize_quick_log_presets, QuickLog};
pub use schedule::{
    compute_reminder_schedule, max_base_reminders, ReminderSlot, ScheduleResult, ScheduleStatus,
};
pub use settings::{Settings, SettingsError};
pub use window::{resolve_windows, WindowSpan};
