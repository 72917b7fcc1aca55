//! Hydration settings snapshot consumed by the scheduler.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_GENTLE_GOAL_THRESHOLD, MAX_TARGET_LITERS};
use crate::time::parse_time_to_minutes;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Daily target in liters.
    pub target_liters: f64,
    /// Window start, "HH:MM".
    pub window_start: String,
    /// Window end, "HH:MM". Earlier than the start means the window wraps past midnight.
    pub window_end: String,
    /// Volume of one sip in ml.
    pub sip_ml: i64,
    pub escalation_enabled: bool,
    pub sound_enabled: bool,
    pub gentle_goal_enabled: bool,
    /// Percent of the target that counts as a "good" day.
    pub gentle_goal_threshold: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_liters: 3.0,
            window_start: "07:00".to_string(),
            window_end: "23:00".to_string(),
            sip_ml: 15,
            escalation_enabled: true,
            sound_enabled: true,
            gentle_goal_enabled: false,
            gentle_goal_threshold: DEFAULT_GENTLE_GOAL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    #[error("target volume must be positive (got {0} L)")]
    NonPositiveTarget(f64),
    #[error("target volume must be at most {max} L (got {0} L)", max = MAX_TARGET_LITERS)]
    TargetTooLarge(f64),
    #[error("sip volume must be positive (got {0} ml)")]
    NonPositiveSip(i64),
    #[error("invalid {field} time '{value}', expected HH:MM")]
    InvalidTime { field: &'static str, value: String },
    #[error("gentle goal threshold must be within 1..=100 (got {0})")]
    ThresholdOutOfRange(i64),
}

impl Settings {
    /// Check the fields a user can get wrong when editing config by hand.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.target_liters.is_finite() && self.target_liters > 0.0) {
            return Err(SettingsError::NonPositiveTarget(self.target_liters));
        }
        if self.target_liters > MAX_TARGET_LITERS {
            return Err(SettingsError::TargetTooLarge(self.target_liters));
        }
        if self.sip_ml <= 0 {
            return Err(SettingsError::NonPositiveSip(self.sip_ml));
        }
        if parse_time_to_minutes(&self.window_start).is_none() {
            return Err(SettingsError::InvalidTime {
                field: "window_start",
                value: self.window_start.clone(),
            });
        }
        if parse_time_to_minutes(&self.window_end).is_none() {
            return Err(SettingsError::InvalidTime {
                field: "window_end",
                value: self.window_end.clone(),
            });
        }
        if !(1..=100).contains(&self.gentle_goal_threshold) {
            return Err(SettingsError::ThresholdOutOfRange(self.gentle_goal_threshold));
        }
        Ok(())
    }

    /// Replace unusable stored values with defaults.
    ///
    /// Non-positive volumes are left alone: a non-positive target or sip size
    /// is reported by the scheduler as a configuration error instead.
    pub fn normalized(mut self) -> Self {
        let defaults = Settings::default();
        if !self.target_liters.is_finite() || self.target_liters > MAX_TARGET_LITERS {
            self.target_liters = defaults.target_liters;
        }
        if parse_time_to_minutes(&self.window_start).is_none() {
            self.window_start = defaults.window_start;
        }
        if parse_time_to_minutes(&self.window_end).is_none() {
            self.window_end = defaults.window_end;
        }
        if !(1..=100).contains(&self.gentle_goal_threshold) {
            self.gentle_goal_threshold = defaults.gentle_goal_threshold;
        }
        self
    }

    pub fn with_window(mut self, start: &str, end: &str) -> Self {
        self.window_start = start.to_string();
        self.window_end = end.to_string();
        self
    }

    pub fn with_target_liters(mut self, liters: f64) -> Self {
        self.target_liters = liters;
        self
    }

    pub fn with_sip_ml(mut self, sip_ml: i64) -> Self {
        self.sip_ml = sip_ml;
        self
    }

    pub fn with_escalation(mut self, enabled: bool) -> Self {
        self.escalation_enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn validate_reports_first_problem() {
        let s = Settings::default().with_sip_ml(0);
        assert_eq!(s.validate(), Err(SettingsError::NonPositiveSip(0)));

        let s = Settings::default().with_window("25:00", "23:00");
        assert!(matches!(
            s.validate(),
            Err(SettingsError::InvalidTime { field: "window_start", .. })
        ));
    }

    #[test]
    fn validate_bounds_target_from_above() {
        let s = Settings::default().with_target_liters(1e16);
        assert_eq!(s.validate(), Err(SettingsError::TargetTooLarge(1e16)));
        assert!(Settings::default().with_target_liters(MAX_TARGET_LITERS).validate().is_ok());
        assert_eq!(s.normalized().target_liters, 3.0);
    }

    #[test]
    fn normalized_restores_bad_times_only() {
        let s = Settings::default()
            .with_window("nope", "22:30")
            .with_target_liters(f64::NAN)
            .with_sip_ml(-3)
            .normalized();
        assert_eq!(s.window_start, "07:00");
        assert_eq!(s.window_end, "22:30");
        assert_eq!(s.target_liters, 3.0);
        assert_eq!(s.sip_ml, -3);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let s: Settings = serde_json::from_str(r#"{"target_liters": 2.5}"#).unwrap();
        assert_eq!(s.target_liters, 2.5);
        assert_eq!(s.window_end, "23:00");
        assert!(s.escalation_enabled);
    }
}
