//! Error types for archive encoding and decoding.

use thiserror::Error;

/// Errors raised while reading or writing an archive document.
#[derive(Debug, Error)]
pub enum ArchiveFormatError {
    #[error("archive is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive is not valid UTF-8")]
    Utf8,
}
