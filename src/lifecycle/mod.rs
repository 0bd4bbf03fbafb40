//! Version lifecycle: trash, restore from trash, permanent delete and the
//! daily retention sweep.
//!
//! Status transitions:
//!
//! ```text
//! ACTIVE --trash--> TRASH --untrash--> ACTIVE
//!                   TRASH --delete / sweep--> (purged)
//! ACTIVE --delete--> (purged)
//! ```

mod retention;

pub use retention::RetentionPolicy;

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::archive::ArchiveStore;
use crate::clock::Clock;
use crate::error::{VaultError, VaultResult};
use crate::index::{Version, VersionIndex, VersionStatus};

/// Outcome of a bulk trash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkTrashReport {
    /// Distinct ids requested
    pub requested: usize,
    pub trashed: Vec<String>,
    /// Ids not present in the index
    pub skipped: Vec<String>,
}

impl BulkTrashReport {
    /// `PartialFailure` when some requested ids were skipped.
    pub fn partial_failure(&self) -> Option<VaultError> {
        (!self.skipped.is_empty()).then(|| VaultError::PartialFailure {
            succeeded: self.trashed.len(),
            failed: self.skipped.len(),
        })
    }
}

/// Outcome of a retention sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Trashed versions examined
    pub scanned: usize,
    /// Purged ids (would-be purged in dry-run mode)
    pub purged: Vec<String>,
    /// Trashed ids still inside the retention window
    pub kept: Vec<String>,
    /// Non-fatal errors; the affected versions stay in the index
    pub errors: Vec<String>,
    pub dry_run: bool,
}

/// A trashed version together with its remaining retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrashedVersion {
    #[serde(flatten)]
    pub version: Version,
    pub days_left: u32,
}

/// Reject blank version ids before touching the index.
pub(crate) fn require_id(id: &str) -> VaultResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(VaultError::ValidationFailed("No version specified.".to_string()));
    }
    Ok(id)
}

/// Applies status transitions and purges to the version index.
pub struct LifecycleManager {
    index: Arc<dyn VersionIndex>,
    archives: ArchiveStore,
    clock: Arc<dyn Clock>,
    policy: RetentionPolicy,
}

impl LifecycleManager {
    pub fn new(index: Arc<dyn VersionIndex>, archives: ArchiveStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            index,
            archives,
            clock,
            policy: RetentionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetentionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Apply `change` to one version inside a single index critical section.
    fn transition(&self, id: &str, change: impl Fn(&mut Version)) -> VaultResult<Version> {
        let id = require_id(id)?;
        let mut updated = None;
        self.index.modify(&mut |map| {
            if let Some(version) = map.get_mut(id) {
                change(version);
                updated = Some(version.clone());
            }
        })?;
        updated.ok_or_else(|| VaultError::NotFound(id.to_string()))
    }

    /// Move a version to the trash. Re-trashing restarts the retention window.
    pub fn trash(&self, id: &str) -> VaultResult<Version> {
        let now = self.clock.now();
        let version = self.transition(id, |v| v.trash(now))?;
        info!(version_id = %version.id, "version moved to trash");
        Ok(version)
    }

    /// Take a version back out of the trash.
    pub fn restore_record(&self, id: &str) -> VaultResult<Version> {
        let version = self.transition(id, Version::untrash)?;
        info!(version_id = %version.id, "version restored from trash");
        Ok(version)
    }

    /// Trash every listed version that exists; unknown ids are skipped.
    pub fn bulk_trash<S: AsRef<str>>(&self, ids: &[S]) -> VaultResult<BulkTrashReport> {
        let mut wanted = BTreeSet::new();
        let mut ordered = Vec::new();
        for id in ids.iter().map(|s| s.as_ref().trim()).filter(|s| !s.is_empty()) {
            if wanted.insert(id) {
                ordered.push(id);
            }
        }
        if ordered.is_empty() {
            return Err(VaultError::ValidationFailed("No versions selected.".to_string()));
        }

        let now = self.clock.now();
        let mut report = BulkTrashReport::default();
        self.index.modify(&mut |map| {
            report = BulkTrashReport {
                requested: ordered.len(),
                ..Default::default()
            };
            for id in &ordered {
                match map.get_mut(*id) {
                    Some(version) => {
                        version.trash(now);
                        report.trashed.push(id.to_string());
                    }
                    None => report.skipped.push(id.to_string()),
                }
            }
        })?;

        info!(
            trashed = report.trashed.len(),
            skipped = report.skipped.len(),
            "bulk trash applied"
        );
        Ok(report)
    }

    /// Delete the archive (best effort) and drop the version from the index.
    pub fn delete_permanently(&self, id: &str) -> VaultResult<Version> {
        let id = require_id(id)?;
        let version = self
            .index
            .get(id)?
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;

        match self.archives.delete(&version) {
            Ok(true) => debug!(filename = %version.filename, "archive deleted"),
            Ok(false) => debug!(filename = %version.filename, "archive already absent"),
            Err(e) => warn!(
                version_id = %version.id,
                filename = %version.filename,
                error = %e,
                "failed to delete archive, removing index entry anyway"
            ),
        }

        self.index.remove(id)?;
        info!(version_id = %version.id, "version deleted permanently");
        Ok(version)
    }

    /// Purge every trashed version whose retention window has elapsed.
    pub fn daily_cleanup(&self) -> VaultResult<CleanupReport> {
        self.sweep_with(self.policy)
    }

    /// Retention sweep under an explicit policy.
    pub fn sweep_with(&self, policy: RetentionPolicy) -> VaultResult<CleanupReport> {
        let now = self.clock.now();
        let mut report = CleanupReport {
            dry_run: policy.dry_run,
            ..Default::default()
        };

        let trashed: Vec<Version> = self
            .index
            .load()?
            .into_values()
            .filter(|v| v.status == VersionStatus::Trash)
            .collect();
        report.scanned = trashed.len();

        for version in trashed {
            // Missing trashed_at counts as trashed right now
            let trashed_at = version.trashed_at.unwrap_or(now);
            if !policy.is_expired(trashed_at, now) {
                report.kept.push(version.id);
                continue;
            }

            if policy.dry_run {
                info!(version_id = %version.id, "dry run: would purge version");
                report.purged.push(version.id);
                continue;
            }

            match self.purge_expired(&version) {
                Ok(true) => {
                    info!(version_id = %version.id, "version purged");
                    report.purged.push(version.id);
                }
                Ok(false) => debug!(version_id = %version.id, "version already gone"),
                Err(e) => {
                    warn!(version_id = %version.id, error = %e, "version not purged, will retry");
                    report.errors.push(e);
                }
            }
        }

        info!(
            scanned = report.scanned,
            purged = report.purged.len(),
            kept = report.kept.len(),
            errors = report.errors.len(),
            "retention sweep finished"
        );
        Ok(report)
    }

    /// Purge one sweep candidate inside a single index critical section.
    ///
    /// The entry is re-read under the lock and purged only while it is still
    /// trashed at the instant the sweep saw. `Ok(false)` when it is already
    /// gone from the index.
    fn purge_expired(&self, candidate: &Version) -> Result<bool, String> {
        let mut outcome = Ok(false);
        self.index
            .modify(&mut |map| {
                let Some(current) = map.get(&candidate.id).cloned() else {
                    outcome = Ok(false);
                    return;
                };
                if current.status != VersionStatus::Trash
                    || current.trashed_at != candidate.trashed_at
                {
                    outcome = Err(format!(
                        "{}: changed since the sweep started, left in place",
                        candidate.id
                    ));
                    return;
                }
                outcome = match self.archives.delete(&current) {
                    Ok(_) => {
                        map.remove(&current.id);
                        Ok(true)
                    }
                    Err(e) => Err(format!(
                        "{}: failed to delete {}: {}",
                        current.id, current.filename, e
                    )),
                };
            })
            .map_err(|e| format!("{}: {}", candidate.id, e))?;
        outcome
    }

    /// Remaining retention for a trashed version; `None` when active.
    pub fn days_left(&self, version: &Version) -> Option<u32> {
        if !version.is_trashed() {
            return None;
        }
        let now = self.clock.now();
        Some(self.policy.days_left(version.trashed_at.unwrap_or(now), now))
    }

    /// Trashed versions, newest first, with their remaining retention.
    pub fn trashed_versions(&self) -> VaultResult<Vec<TrashedVersion>> {
        Ok(self
            .index
            .list()?
            .into_iter()
            .filter_map(|version| {
                self.days_left(&version)
                    .map(|days_left| TrashedVersion { version, days_left })
            })
            .collect())
    }
}
