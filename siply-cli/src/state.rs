use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use siply_core::{History, Progress, QuickLog};
use std::fs;
use std::path::{Path, PathBuf};

/// `$SIPLY_HOME`, or `~/.siply`.
pub fn siply_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SIPLY_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".siply"))
}

pub fn ensure_siply_home() -> Result<PathBuf> {
    let dir = siply_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn notifications_dir() -> Result<PathBuf> {
    let dir = ensure_siply_home()?.join("notifications");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn progress_path() -> Result<PathBuf> {
    Ok(ensure_siply_home()?.join("progress.json"))
}

pub fn history_path() -> Result<PathBuf> {
    Ok(ensure_siply_home()?.join("history.json"))
}

pub fn quick_log_path() -> Result<PathBuf> {
    Ok(ensure_siply_home()?.join("quick_log.json"))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(value))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Today's progress; anything stored for an earlier day is discarded.
pub fn read_progress(today_key: &str) -> Result<Progress> {
    let stored = read_json::<Progress>(&progress_path()?)?;
    Ok(Progress::for_today(stored, today_key))
}

pub fn write_progress(progress: &Progress) -> Result<()> {
    write_json(&progress_path()?, progress)
}

pub fn read_history() -> Result<History> {
    Ok(read_json::<History>(&history_path()?)?.unwrap_or_default())
}

pub fn write_history(history: &History) -> Result<()> {
    write_json(&history_path()?, history)
}

pub fn read_quick_log() -> Result<QuickLog> {
    Ok(read_json::<QuickLog>(&quick_log_path()?)?
        .unwrap_or_default()
        .normalized())
}

pub fn write_quick_log(quick_log: &QuickLog) -> Result<()> {
    write_json(&quick_log_path()?, quick_log)
}
