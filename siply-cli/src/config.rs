use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use siply_core::Settings;
use std::fs;
use std::path::PathBuf;

use crate::state::ensure_siply_home;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub hydration: Settings,
    #[serde(default)]
    pub notifications: NotificationsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsSection {
    /// Max intents printed by one `notify dispatch` run.
    pub dispatch_limit: usize,
    /// How long a dispatched id is remembered.
    pub handled_ttl_hours: i64,
}

/// One year.
const MAX_HANDLED_TTL_HOURS: i64 = 24 * 365;

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            dispatch_limit: 10,
            handled_ttl_hours: 48,
        }
    }
}

impl NotificationsSection {
    /// Replace a hand-edited TTL outside `1..=MAX_HANDLED_TTL_HOURS` with the default.
    pub fn normalized(mut self) -> Self {
        if !(1..=MAX_HANDLED_TTL_HOURS).contains(&self.handled_ttl_hours) {
            self.handled_ttl_hours = Self::default().handled_ttl_hours;
        }
        self
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_siply_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

/// Parse config TOML, restoring defaults for values the engine can't use.
pub fn parse_config(s: &str) -> Result<Config> {
    let mut cfg: Config = toml::from_str(s).context("parse config.toml")?;
    cfg.hydration = cfg.hydration.normalized();
    cfg.notifications = cfg.notifications.normalized();
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    tracing::info!(path = %p.display(), "config saved");
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => bail!("expected true/false, got '{other}'"),
    }
}

/// Apply `key = value` to the config, rejecting settings the scheduler can't use.
pub fn set_value(cfg: &mut Config, key: &str, value: &str) -> Result<()> {
    let mut next = cfg.hydration.clone();
    match key {
        "target_liters" => {
            next.target_liters = value.parse().with_context(|| format!("parse {key}"))?;
        }
        "window_start" => next.window_start = value.trim().to_string(),
        "window_end" => next.window_end = value.trim().to_string(),
        "sip_ml" => next.sip_ml = value.parse().with_context(|| format!("parse {key}"))?,
        "escalation_enabled" => next.escalation_enabled = parse_bool(value)?,
        "sound_enabled" => next.sound_enabled = parse_bool(value)?,
        "gentle_goal_enabled" => next.gentle_goal_enabled = parse_bool(value)?,
        "gentle_goal_threshold" => {
            next.gentle_goal_threshold = value.parse().with_context(|| format!("parse {key}"))?;
        }
        "dispatch_limit" => {
            cfg.notifications.dispatch_limit =
                value.parse().with_context(|| format!("parse {key}"))?;
            return Ok(());
        }
        "handled_ttl_hours" => {
            let hours: i64 = value.parse().with_context(|| format!("parse {key}"))?;
            if !(1..=MAX_HANDLED_TTL_HOURS).contains(&hours) {
                bail!("handled_ttl_hours must be within 1..={MAX_HANDLED_TTL_HOURS}");
            }
            cfg.notifications.handled_ttl_hours = hours;
            return Ok(());
        }
        other => bail!("unknown config key: {other}"),
    }
    next.validate()?;
    cfg.hydration = next;
    Ok(())
}
