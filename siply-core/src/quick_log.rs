//! Quick-log presets: a short list of drink sizes plus the last amount logged.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_QUICK_LOG_PRESETS, QUICK_LOG_MAX_PRESETS, QUICK_LOG_MIN_PRESETS};

/// Positive values only, first occurrence wins, at most `QUICK_LOG_MAX_PRESETS`.
fn clean_presets(raw: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    raw.iter()
        .copied()
        .filter(|&ml| ml > 0 && seen.insert(ml))
        .take(QUICK_LOG_MAX_PRESETS)
        .collect()
}

/// Clean a stored preset list, falling back when too few usable values remain.
pub fn normalize_quick_log_presets(raw: &[i64], fallback: &[i64]) -> Vec<i64> {
    let cleaned = clean_presets(raw);
    if cleaned.len() >= QUICK_LOG_MIN_PRESETS {
        return cleaned;
    }
    fallback.iter().copied().take(QUICK_LOG_MAX_PRESETS).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickLog {
    /// Drink sizes in ml, in display order.
    pub presets: Vec<i64>,
    pub last_used_ml: Option<i64>,
}

impl Default for QuickLog {
    fn default() -> Self {
        Self {
            presets: DEFAULT_QUICK_LOG_PRESETS.to_vec(),
            last_used_ml: None,
        }
    }
}

impl QuickLog {
    /// Repair whatever was loaded from disk.
    pub fn normalized(mut self) -> Self {
        self.presets = normalize_quick_log_presets(&self.presets, &DEFAULT_QUICK_LOG_PRESETS);
        self.last_used_ml = self.last_used_ml.filter(|&ml| ml > 0);
        self
    }

    /// Replace the presets. A list with fewer than `QUICK_LOG_MIN_PRESETS`
    /// usable values is rejected and the current presets stay.
    pub fn set_presets(&mut self, raw: &[i64]) -> bool {
        let cleaned = clean_presets(raw);
        if cleaned.len() < QUICK_LOG_MIN_PRESETS {
            return false;
        }
        self.presets = cleaned;
        true
    }

    /// Preset by 1-based position, as shown to the user.
    pub fn preset(&self, position: usize) -> Option<i64> {
        position
            .checked_sub(1)
            .and_then(|i| self.presets.get(i))
            .copied()
    }

    /// Remember a logged amount. Non-positive amounts are ignored.
    pub fn record_use(&mut self, amount_ml: i64) {
        if amount_ml > 0 {
            self.last_used_ml = Some(amount_ml);
        }
    }
}
