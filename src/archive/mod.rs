//! Archive file store
//!
//! Archives are write-once JSON files in the archive directory, named
//! `v_<unix-seconds>_<6 hex chars>.json`. They are never modified, only
//! deleted when their version is purged.

mod local;

pub use local::{LocalFileStore, ACCESS_DENIAL_MARKER};

use chrono::{DateTime, Utc};
use std::io;
use std::sync::Arc;

use snapvault_archive::Archive;
use tracing::debug;

use crate::error::{VaultError, VaultResult};
use crate::index::Version;

/// Byte-level storage for archive files.
pub trait FileStore: Send + Sync {
    /// Make sure the store can accept writes (directory, access marker).
    fn ensure_ready(&self) -> io::Result<()>;

    /// Write a new file. Fails if `name` already exists.
    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()>;

    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    fn exists(&self, name: &str) -> bool;

    /// Delete a file. `Ok(false)` when it was already absent.
    fn delete(&self, name: &str) -> io::Result<bool>;
}

/// Generate an archive filename for a snapshot taken at `now`.
pub fn generate_filename(now: DateTime<Utc>) -> String {
    let suffix: [u8; 3] = rand::random();
    format!("v_{}_{}.json", now.timestamp(), hex::encode(suffix))
}

/// Typed access to archives on top of a [`FileStore`].
#[derive(Clone)]
pub struct ArchiveStore {
    files: Arc<dyn FileStore>,
}

impl ArchiveStore {
    /// Attempts at finding an unused filename before giving up.
    const NAME_ATTEMPTS: usize = 8;

    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &Arc<dyn FileStore> {
        &self.files
    }

    /// Serialize and write `archive`, returning the filename used.
    pub fn write(&self, archive: &Archive, now: DateTime<Utc>) -> VaultResult<String> {
        let bytes = archive
            .to_json_bytes()
            .map_err(|e| VaultError::StorageWriteFailed(e.to_string()))?;

        self.files
            .ensure_ready()
            .map_err(|e| VaultError::StorageWriteFailed(format!("archive directory: {}", e)))?;

        let mut last_error = None;
        for _ in 0..Self::NAME_ATTEMPTS {
            let filename = generate_filename(now);
            match self.files.write(&filename, &bytes) {
                Ok(()) => {
                    debug!(filename = %filename, bytes = bytes.len(), "archive written");
                    return Ok(filename);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => last_error = Some(e),
                Err(e) => return Err(VaultError::StorageWriteFailed(format!("{}: {}", filename, e))),
            }
        }

        Err(VaultError::StorageWriteFailed(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no unused archive filename".to_string()),
        ))
    }

    /// Read and parse the archive referenced by `version`.
    pub fn read(&self, version: &Version) -> VaultResult<Archive> {
        let missing = |reason: String| VaultError::ArchiveMissing {
            version_id: version.id.clone(),
            filename: version.filename.clone(),
            reason,
        };

        let bytes = self.files.read(&version.filename).map_err(|e| missing(e.to_string()))?;
        Archive::from_json_slice(&bytes).map_err(|e| missing(e.to_string()))
    }

    pub fn exists(&self, version: &Version) -> bool {
        self.files.exists(&version.filename)
    }

    /// Best-effort delete of a version's archive. `Ok(false)` when already gone.
    pub fn delete(&self, version: &Version) -> io::Result<bool> {
        self.files.delete(&version.filename)
    }
}
