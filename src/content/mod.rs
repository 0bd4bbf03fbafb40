//! Content repository
//!
//! The live record collection is owned by an external repository. The vault
//! only reads it during a snapshot and creates or overwrites records during a
//! restore; it never deletes a live record.

mod file;
mod memory;

pub use file::FileRepository;
pub use memory::MemoryRepository;

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use snapvault_archive::{AttributeSet, RecordId, RecordSnapshot};

use crate::persist::LockError;

/// Content repository result type
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors from repository operations
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("record not found: {0}")]
    NotFound(RecordId),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("record collection is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    #[error("repository rejected the write: {0}")]
    Rejected(String),
}

/// A live record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Type marker; only the managed kind is snapshotted and restored
    pub kind: String,
    pub title: String,
    pub body: String,
    pub status: String,
    pub slug: String,
}

/// Writable fields of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub kind: String,
    pub title: String,
    pub body: String,
    pub status: String,
    pub slug: String,
}

impl RecordFields {
    /// Fields that recreate `snapshot` as a record of `kind`.
    pub fn from_snapshot(snapshot: &RecordSnapshot, kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            title: snapshot.title.clone(),
            body: snapshot.body.clone(),
            status: snapshot.status.clone(),
            slug: snapshot.slug.clone(),
        }
    }
}

impl Record {
    /// Capture this record together with its attributes.
    pub fn to_snapshot(&self, attributes: AttributeSet) -> RecordSnapshot {
        RecordSnapshot {
            id: self.id.clone(),
            title: self.title.clone(),
            body: self.body.clone(),
            status: self.status.clone(),
            slug: self.slug.clone(),
            attributes,
        }
    }
}

/// Narrow interface onto the live record collection.
pub trait ContentRepository: Send + Sync {
    /// Every record of `kind`, whatever its status, unpaginated.
    fn list_all(&self, kind: &str) -> ContentResult<Vec<Record>>;

    /// The record at `id`, of any kind.
    fn get(&self, id: &RecordId) -> ContentResult<Option<Record>>;

    /// Create a record; the repository assigns the identifier.
    fn create(&self, fields: &RecordFields) -> ContentResult<RecordId>;

    /// Overwrite the fields of an existing record.
    fn update(&self, id: &RecordId, fields: &RecordFields) -> ContentResult<()>;

    fn list_attributes(&self, id: &RecordId) -> ContentResult<AttributeSet>;

    /// Remove every value stored under `key`.
    fn delete_attribute(&self, id: &RecordId, key: &str) -> ContentResult<()>;

    /// Append one value under `key`.
    fn add_attribute(&self, id: &RecordId, key: &str, value: &str) -> ContentResult<()>;
}
