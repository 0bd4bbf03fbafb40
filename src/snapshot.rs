//! Snapshot engine: captures every record of the managed kind into a new
//! archive and registers it as an active version.

use std::sync::Arc;
use tracing::{info, warn};

use snapvault_archive::Archive;

use crate::archive::ArchiveStore;
use crate::clock::Clock;
use crate::content::ContentRepository;
use crate::error::VaultResult;
use crate::index::{Version, VersionIndex};

/// Description format used when none is given.
pub const AUTO_DESCRIPTION_FORMAT: &str = "Auto Backup %Y-%m-%d %H:%M";

pub struct SnapshotEngine {
    repo: Arc<dyn ContentRepository>,
    archives: ArchiveStore,
    index: Arc<dyn VersionIndex>,
    clock: Arc<dyn Clock>,
    managed_kind: String,
}

impl SnapshotEngine {
    pub fn new(
        repo: Arc<dyn ContentRepository>,
        archives: ArchiveStore,
        index: Arc<dyn VersionIndex>,
        clock: Arc<dyn Clock>,
        managed_kind: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            archives,
            index,
            clock,
            managed_kind: managed_kind.into(),
        }
    }

    /// Capture every managed record, whatever its status, with all attributes.
    pub fn capture(&self) -> VaultResult<Archive> {
        let mut snapshots = Vec::new();
        for record in self.repo.list_all(&self.managed_kind)? {
            let attributes = self.repo.list_attributes(&record.id)?;
            snapshots.push(record.to_snapshot(attributes));
        }
        Ok(Archive::new(snapshots))
    }

    /// Write a new archive and register it as an active version.
    ///
    /// The archive is written before the index is touched; if registration
    /// fails the fresh archive is removed again.
    pub fn create_version(&self, description: Option<&str>) -> VaultResult<Version> {
        let now = self.clock.now();
        let description = match description.map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => now.format(AUTO_DESCRIPTION_FORMAT).to_string(),
        };

        let archive = self.capture()?;
        let filename = self.archives.write(&archive, now)?;
        let version = Version::new(description, filename, archive.len(), now);

        if let Err(e) = self.index.put(version.clone()) {
            if let Err(cleanup) = self.archives.delete(&version) {
                warn!(
                    filename = %version.filename,
                    error = %cleanup,
                    "failed to remove unregistered archive"
                );
            }
            return Err(e.into());
        }

        info!(
            version_id = %version.id,
            count = version.count,
            filename = %version.filename,
            "version created"
        );
        Ok(version)
    }
}
