//! Trash retention policy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::SECONDS_PER_DAY;

/// How long trashed versions are kept before the daily sweep purges them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Days a version stays in the trash
    pub retention_days: u32,
    /// Report candidates without deleting anything
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::keep_days(30)
    }
}

impl RetentionPolicy {
    pub fn keep_days(days: u32) -> Self {
        Self {
            retention_days: days,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    fn window_seconds(&self) -> i64 {
        i64::from(self.retention_days) * SECONDS_PER_DAY
    }

    /// A version trashed at `trashed_at` may be purged once the full window
    /// has elapsed.
    pub fn is_expired(&self, trashed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        (now - trashed_at).num_seconds() >= self.window_seconds()
    }

    /// Whole days left before purge, never negative.
    pub fn days_left(&self, trashed_at: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
        let elapsed_days = (now - trashed_at).num_seconds().max(0) / SECONDS_PER_DAY;
        (i64::from(self.retention_days) - elapsed_days).max(0) as u32
    }
}
