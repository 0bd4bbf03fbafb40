//! snapvault archive format
//!
//! Defines the JSON document written for every snapshot: an array of record
//! snapshots, each carrying its full attribute multimap. The field names are
//! a compatibility surface with archives produced by earlier exporters.

pub mod attributes;
pub mod error;
pub mod id;
pub mod snapshot;

pub use attributes::AttributeSet;
pub use error::ArchiveFormatError;
pub use id::RecordId;
pub use snapshot::{Archive, RecordSnapshot};

use sha2::{Digest, Sha256};

/// Compute the content hash of a record body (SHA-256, lowercase hex).
///
/// Two bodies are considered identical exactly when their hashes match.
pub fn content_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}
