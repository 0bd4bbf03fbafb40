//! Top-level error type for vault operations.
//!
//! Lower layers keep their own error enums; they are folded into
//! `VaultError` at the engine boundary.

use thiserror::Error;

use crate::content::ContentError;
use crate::index::IndexError;

/// Result alias used by the engines.
pub type VaultResult<T> = Result<T, VaultError>;

/// Errors surfaced by snapshot, lifecycle and restore operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The referenced version is not in the index.
    #[error("version not found: {0}")]
    NotFound(String),

    /// The index references an archive that cannot be read or parsed.
    #[error("archive {filename} for version {version_id} is missing or unreadable: {reason}")]
    ArchiveMissing {
        version_id: String,
        filename: String,
        reason: String,
    },

    /// Writing an archive (or creating its directory) failed.
    #[error("failed to write archive: {0}")]
    StorageWriteFailed(String),

    /// A required input was empty or malformed.
    #[error("{0}")]
    ValidationFailed(String),

    /// A batch finished with some items succeeding and some failing.
    #[error("{succeeded} succeeded, {failed} failed")]
    PartialFailure { succeeded: usize, failed: usize },

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("content repository error: {0}")]
    Content(#[from] ContentError),
}

impl VaultError {
    /// Short message suitable for a one-line admin notice.
    pub fn notice_text(&self) -> String {
        match self {
            Self::NotFound(_) => "Version not found.".to_string(),
            Self::ArchiveMissing { .. } => "File missing from disk.".to_string(),
            Self::StorageWriteFailed(_) => "Error creating file. Check permissions.".to_string(),
            Self::PartialFailure { succeeded, failed } => {
                format!("{} items processed, {} failed.", succeeded, failed)
            }
            other => other.to_string(),
        }
    }
}
