//! One-line operator notices.

use serde::Serialize;
use std::fmt;

use crate::error::VaultError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Message shown to the operator after an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NoticeKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    pub fn version_created() -> Self {
        Self::success("Version created successfully.")
    }

    pub fn version_trashed() -> Self {
        Self::success("Version moved to trash.")
    }

    pub fn versions_trashed(count: usize) -> Self {
        Self::success(format!("{} versions moved to trash.", count))
    }

    pub fn version_untrashed() -> Self {
        Self::success("Version restored from trash.")
    }

    pub fn version_deleted() -> Self {
        Self::success("Version deleted permanently.")
    }

    pub fn records_restored(count: usize) -> Self {
        Self::success(format!("{} records processed successfully.", count))
    }

    pub fn cleanup_finished(purged: usize, dry_run: bool) -> Self {
        if dry_run {
            Self::success(format!("{} versions would be deleted permanently.", purged))
        } else {
            Self::success(format!("{} versions deleted permanently.", purged))
        }
    }
}

impl From<&VaultError> for Notice {
    fn from(err: &VaultError) -> Self {
        Self::error(err.notice_text())
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
