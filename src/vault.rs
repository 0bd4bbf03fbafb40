//! Vault facade: wires the stores to the snapshot, lifecycle and restore
//! engines.

use std::sync::Arc;

use snapvault_archive::RecordId;

use crate::archive::{ArchiveStore, FileStore, LocalFileStore};
use crate::clock::{Clock, SystemClock};
use crate::config::VaultConfig;
use crate::content::{ContentRepository, FileRepository};
use crate::error::{VaultError, VaultResult};
use crate::index::{SettingsIndex, Version, VersionIndex};
use crate::lifecycle::{
    require_id, BulkTrashReport, CleanupReport, LifecycleManager, RetentionPolicy, TrashedVersion,
};
use crate::restore::{Inspection, RestoreReconciler, RestoreReport};
use crate::settings::FileSettings;
use crate::snapshot::SnapshotEngine;

/// Collaborators a vault is assembled from.
pub struct VaultParts {
    pub index: Arc<dyn VersionIndex>,
    pub files: Arc<dyn FileStore>,
    pub repo: Arc<dyn ContentRepository>,
    pub clock: Arc<dyn Clock>,
    pub policy: RetentionPolicy,
    pub managed_kind: String,
    pub type_attribute: String,
}

pub struct Vault {
    index: Arc<dyn VersionIndex>,
    snapshots: SnapshotEngine,
    lifecycle: LifecycleManager,
    reconciler: RestoreReconciler,
}

impl Vault {
    /// Open the file-backed vault described by `config`.
    pub fn open(config: &VaultConfig) -> Self {
        let timeout = config.lock_timeout();
        let settings = FileSettings::new(config.settings_file()).with_lock_timeout(timeout);
        let repo = FileRepository::new(config.records_file()).with_lock_timeout(timeout);

        Self::with_parts(VaultParts {
            index: Arc::new(SettingsIndex::with_key(settings, config.index_key.clone())),
            files: Arc::new(LocalFileStore::new(config.archive_path())),
            repo: Arc::new(repo),
            clock: Arc::new(SystemClock),
            policy: config.retention_policy(),
            managed_kind: config.managed_kind.clone(),
            type_attribute: config.type_attribute.clone(),
        })
    }

    pub fn with_parts(parts: VaultParts) -> Self {
        let archives = ArchiveStore::new(parts.files);
        Self {
            snapshots: SnapshotEngine::new(
                parts.repo.clone(),
                archives.clone(),
                parts.index.clone(),
                parts.clock.clone(),
                parts.managed_kind.clone(),
            ),
            lifecycle: LifecycleManager::new(parts.index.clone(), archives.clone(), parts.clock)
                .with_policy(parts.policy),
            reconciler: RestoreReconciler::new(
                parts.repo,
                archives,
                parts.index.clone(),
                parts.managed_kind,
                parts.type_attribute,
            ),
            index: parts.index,
        }
    }

    /// All versions, newest first.
    pub fn list_versions(&self) -> VaultResult<Vec<Version>> {
        Ok(self.index.list()?)
    }

    pub fn active_versions(&self) -> VaultResult<Vec<Version>> {
        Ok(self
            .list_versions()?
            .into_iter()
            .filter(Version::is_active)
            .collect())
    }

    pub fn trashed_versions(&self) -> VaultResult<Vec<TrashedVersion>> {
        self.lifecycle.trashed_versions()
    }

    pub fn get_version(&self, id: &str) -> VaultResult<Version> {
        let id = require_id(id)?;
        self.index
            .get(id)?
            .ok_or_else(|| VaultError::NotFound(id.to_string()))
    }

    pub fn create_version(&self, description: Option<&str>) -> VaultResult<Version> {
        self.snapshots.create_version(description)
    }

    pub fn trash(&self, id: &str) -> VaultResult<Version> {
        self.lifecycle.trash(id)
    }

    pub fn restore_record(&self, id: &str) -> VaultResult<Version> {
        self.lifecycle.restore_record(id)
    }

    pub fn bulk_trash<S: AsRef<str>>(&self, ids: &[S]) -> VaultResult<BulkTrashReport> {
        self.lifecycle.bulk_trash(ids)
    }

    pub fn delete_permanently(&self, id: &str) -> VaultResult<Version> {
        self.lifecycle.delete_permanently(id)
    }

    pub fn daily_cleanup(&self) -> VaultResult<CleanupReport> {
        self.lifecycle.daily_cleanup()
    }

    /// Run the sweep with a different policy (e.g. dry run) on the same stores.
    pub fn daily_cleanup_with(&self, policy: RetentionPolicy) -> VaultResult<CleanupReport> {
        self.lifecycle.sweep_with(policy)
    }

    pub fn days_left(&self, version: &Version) -> Option<u32> {
        self.lifecycle.days_left(version)
    }

    pub fn inspect(&self, version_id: &str) -> VaultResult<Inspection> {
        self.reconciler.inspect(version_id)
    }

    pub fn restore_records(
        &self,
        version_id: &str,
        selected: &[RecordId],
    ) -> VaultResult<RestoreReport> {
        self.reconciler.classify_and_restore(version_id, selected)
    }
}
