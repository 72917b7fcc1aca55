//! Resolve the daily window into concrete spans around "now".

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::calculations::get_window_minutes;
use crate::constants::HORIZON_MINUTES;
use crate::settings::Settings;
use crate::time::{add_days, add_minutes, set_time_on_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpan {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WindowSpan {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at < self.end
    }
}

/// Window spans anchored on yesterday, today and tomorrow that overlap the
/// look-ahead horizon, ordered by start.
///
/// Yesterday's span only survives when an overnight window is still running.
pub fn resolve_windows(now: NaiveDateTime, settings: &Settings) -> Vec<WindowSpan> {
    let window_minutes = get_window_minutes(settings);
    if window_minutes <= 0 {
        return Vec::new();
    }
    let horizon_end = add_minutes(now, HORIZON_MINUTES);

    let mut spans: Vec<WindowSpan> = [-1, 0, 1]
        .into_iter()
        .filter_map(|offset| {
            let start = set_time_on_date(add_days(now, offset), &settings.window_start)?;
            let end = add_minutes(start, window_minutes);
            Some(WindowSpan { start, end })
        })
        .filter(|span| span.end > now && span.start <= horizon_end)
        .collect();

    spans.sort_by_key(|span| span.start);
    spans
}
