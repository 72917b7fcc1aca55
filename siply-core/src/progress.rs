//! Consumption for the current local day.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Day key, "YYYY-MM-DD".
    pub date: String,
    pub consumed_ml: i64,
}

impl Progress {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            consumed_ml: 0,
        }
    }

    /// Carry stored progress forward only if it belongs to `today_key`.
    pub fn for_today(stored: Option<Progress>, today_key: &str) -> Self {
        match stored {
            Some(p) if p.date == today_key => Self {
                consumed_ml: p.consumed_ml.max(0),
                ..p
            },
            _ => Self::new(today_key),
        }
    }

    /// Add a logged drink. Non-positive amounts are ignored.
    pub fn log(&mut self, amount_ml: i64) -> bool {
        if amount_ml <= 0 {
            return false;
        }
        self.consumed_ml = self.consumed_ml.saturating_add(amount_ml);
        true
    }
}
