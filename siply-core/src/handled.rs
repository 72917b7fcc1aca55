//! Time-bounded record of notification ids that were already acted on.
//!
//! The scheduler regenerates the same ids on every call, so a delivery layer
//! that must not repeat itself keeps this beside it. Entries expire after
//! `ttl_minutes`, which keeps the cache from growing without bound.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandledCache {
    pub ttl_minutes: i64,
    #[serde(default)]
    entries: HashMap<String, NaiveDateTime>,
}

impl HandledCache {
    pub fn new(ttl_minutes: i64) -> Self {
        Self {
            ttl_minutes,
            entries: HashMap::new(),
        }
    }

    /// TTL as a duration; values past chrono's range never expire.
    fn ttl(&self) -> Duration {
        Duration::try_minutes(self.ttl_minutes.max(0)).unwrap_or(Duration::MAX)
    }

    fn expired(&self, handled_at: NaiveDateTime, now: NaiveDateTime) -> bool {
        now - handled_at >= self.ttl()
    }

    pub fn is_handled(&self, id: &str, now: NaiveDateTime) -> bool {
        self.entries
            .get(id)
            .is_some_and(|&handled_at| !self.expired(handled_at, now))
    }

    /// Mark `id` as handled at `now`. Returns false if it already was.
    pub fn mark(&mut self, id: impl Into<String>, now: NaiveDateTime) -> bool {
        let id = id.into();
        if self.is_handled(&id, now) {
            return false;
        }
        self.entries.insert(id, now);
        true
    }

    /// Forget expired entries; returns how many were removed.
    pub fn prune(&mut self, now: NaiveDateTime) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl();
        self.entries.retain(|_, handled_at| now - *handled_at < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
