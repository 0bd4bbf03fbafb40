//! Version metadata and status model
//!
//! Version status: ACTIVE ⇄ TRASH → (purged, removed from the index)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Lifecycle status of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    /// Listed with the live versions
    Active,
    /// Soft-deleted, waiting for purge
    Trash,
}

impl fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Trash => write!(f, "trash"),
        }
    }
}

/// One snapshot event. The archive content lives in `filename`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Opaque unique identifier
    pub id: String,

    /// Creation time (Unix seconds on disk)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub timestamp: DateTime<Utc>,

    /// Free-text label
    pub description: String,

    /// Archive file name, relative to the archive directory
    pub filename: String,

    /// Number of records captured
    pub count: usize,

    pub status: VersionStatus,

    /// Set while the version is in the trash
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub trashed_at: Option<DateTime<Utc>>,
}

impl Version {
    /// Create a new active version with a freshly generated id.
    pub fn new(
        description: impl Into<String>,
        filename: impl Into<String>,
        count: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Ulid::new().to_string(),
            timestamp,
            description: description.into(),
            filename: filename.into(),
            count,
            status: VersionStatus::Active,
            trashed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == VersionStatus::Active
    }

    pub fn is_trashed(&self) -> bool {
        self.status == VersionStatus::Trash
    }

    /// Move to the trash at `now`.
    pub fn trash(&mut self, now: DateTime<Utc>) {
        self.status = VersionStatus::Trash;
        self.trashed_at = Some(now);
    }

    /// Take back out of the trash.
    pub fn untrash(&mut self) {
        self.status = VersionStatus::Active;
        self.trashed_at = None;
    }
}
