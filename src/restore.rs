//! Restore reconciler: compares an archive with the live collection and
//! writes selected snapshots back.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use snapvault_archive::{content_hash, AttributeSet, RecordId, RecordSnapshot};

use crate::archive::ArchiveStore;
use crate::content::{ContentRepository, ContentResult, RecordFields};
use crate::error::{VaultError, VaultResult};
use crate::index::{Version, VersionIndex};
use crate::lifecycle::require_id;

/// Type label used when a snapshot has no type attribute.
pub const DEFAULT_TYPE_LABEL: &str = "SNIPPET";

/// How an archived record relates to the live collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordState {
    /// No managed live record at that id; restore creates a new one
    Deleted,
    /// Live body differs; restore overwrites
    Changed,
    /// Same body; restore is an idempotent overwrite
    Identical,
}

impl RecordState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deleted => "Deleted (Will create new)",
            Self::Changed => "Changed (Will overwrite)",
            Self::Identical => "Identical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectedRecord {
    pub id: RecordId,
    pub title: String,
    pub status: String,
    pub type_label: String,
    pub state: RecordState,
    pub action: &'static str,
}

/// Per-record comparison of one version against the live collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub version: Version,
    pub records: Vec<InspectedRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedRecord {
    pub archived_id: RecordId,
    pub new_id: RecordId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRecord {
    pub id: RecordId,
    pub reason: String,
}

/// Outcome of a selective restore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub version_id: String,
    /// Overwritten in place
    pub updated: Vec<RecordId>,
    /// Recreated under a new identifier
    pub created: Vec<CreatedRecord>,
    /// Selected ids the archive does not contain
    pub not_in_archive: Vec<RecordId>,
    pub failed: Vec<FailedRecord>,
}

impl RestoreReport {
    fn empty(version_id: &str) -> Self {
        Self {
            version_id: version_id.to_string(),
            ..Default::default()
        }
    }

    /// Records successfully created or updated.
    pub fn processed(&self) -> usize {
        self.updated.len() + self.created.len()
    }

    pub fn partial_failure(&self) -> Option<VaultError> {
        (!self.failed.is_empty()).then(|| VaultError::PartialFailure {
            succeeded: self.processed(),
            failed: self.failed.len(),
        })
    }
}

/// Action taken for one restored record, with the live id it landed on.
enum Restored {
    Updated(RecordId),
    Created(RecordId),
}

impl Restored {
    fn target(&self) -> &RecordId {
        match self {
            Self::Updated(id) | Self::Created(id) => id,
        }
    }
}

pub struct RestoreReconciler {
    repo: Arc<dyn ContentRepository>,
    archives: ArchiveStore,
    index: Arc<dyn VersionIndex>,
    managed_kind: String,
    type_attribute: String,
}

impl RestoreReconciler {
    pub fn new(
        repo: Arc<dyn ContentRepository>,
        archives: ArchiveStore,
        index: Arc<dyn VersionIndex>,
        managed_kind: impl Into<String>,
        type_attribute: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            archives,
            index,
            managed_kind: managed_kind.into(),
            type_attribute: type_attribute.into(),
        }
    }

    fn load_version(&self, version_id: &str) -> VaultResult<Version> {
        self.index
            .get(version_id)?
            .ok_or_else(|| VaultError::NotFound(version_id.to_string()))
    }

    /// Classify one snapshot against the live collection.
    pub fn classify(&self, snapshot: &RecordSnapshot) -> ContentResult<RecordState> {
        let state = match self.repo.get(&snapshot.id)? {
            Some(live) if live.kind == self.managed_kind => {
                if content_hash(&live.body) == snapshot.body_hash() {
                    RecordState::Identical
                } else {
                    RecordState::Changed
                }
            }
            _ => RecordState::Deleted,
        };
        debug!(record_id = %snapshot.id, state = state.label(), "classified record");
        Ok(state)
    }

    fn type_label(&self, snapshot: &RecordSnapshot) -> String {
        snapshot
            .attributes
            .first(&self.type_attribute)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| DEFAULT_TYPE_LABEL.to_string())
    }

    /// Compare every snapshot of a version with the live collection.
    pub fn inspect(&self, version_id: &str) -> VaultResult<Inspection> {
        let version = self.load_version(require_id(version_id)?)?;
        let archive = self.archives.read(&version)?;

        let mut records = Vec::with_capacity(archive.len());
        for snapshot in archive.records() {
            let state = self.classify(snapshot)?;
            records.push(InspectedRecord {
                id: snapshot.id.clone(),
                title: snapshot.title.clone(),
                status: snapshot.status.clone(),
                type_label: self.type_label(snapshot),
                state,
                action: state.label(),
            });
        }

        Ok(Inspection { version, records })
    }

    /// Restore the selected records from a version.
    ///
    /// An empty version id or selection is a no-op. Ids missing from the
    /// archive are skipped; per-record failures do not stop the batch.
    pub fn classify_and_restore(
        &self,
        version_id: &str,
        selected: &[RecordId],
    ) -> VaultResult<RestoreReport> {
        let version_id = version_id.trim();
        if version_id.is_empty() || selected.is_empty() {
            return Ok(RestoreReport::empty(version_id));
        }

        let version = self.load_version(version_id)?;
        let archive = self.archives.read(&version)?;
        let by_id = archive.index_by_id();

        let mut report = RestoreReport::empty(&version.id);
        let mut seen = HashSet::new();
        for id in selected {
            if !seen.insert(id) {
                continue;
            }
            let Some(snapshot) = by_id.get(id) else {
                debug!(record_id = %id, "record not in archive, skipping");
                report.not_in_archive.push(id.clone());
                continue;
            };

            match self.restore_one(snapshot) {
                Ok(Restored::Updated(target)) => report.updated.push(target),
                Ok(Restored::Created(target)) => report.created.push(CreatedRecord {
                    archived_id: snapshot.id.clone(),
                    new_id: target,
                }),
                Err(e) => {
                    warn!(record_id = %id, error = %e, "failed to restore record");
                    report.failed.push(FailedRecord {
                        id: id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            version_id = %version.id,
            processed = report.processed(),
            failed = report.failed.len(),
            "restore finished"
        );
        Ok(report)
    }

    /// Write one snapshot back, reporting which action was taken.
    fn restore_one(&self, snapshot: &RecordSnapshot) -> ContentResult<Restored> {
        let fields = RecordFields::from_snapshot(snapshot, &self.managed_kind);
        let restored = match self.classify(snapshot)? {
            RecordState::Changed | RecordState::Identical => {
                self.repo.update(&snapshot.id, &fields)?;
                Restored::Updated(snapshot.id.clone())
            }
            RecordState::Deleted => Restored::Created(self.repo.create(&fields)?),
        };
        self.replace_attributes(restored.target(), &snapshot.attributes)?;
        Ok(restored)
    }

    /// Make the live attribute set exactly equal to `archived`.
    fn replace_attributes(&self, target: &RecordId, archived: &AttributeSet) -> ContentResult<()> {
        let current = self.repo.list_attributes(target)?;
        for key in current.keys() {
            self.repo.delete_attribute(target, key)?;
        }
        for (key, values) in archived.iter() {
            for value in values {
                self.repo.add_attribute(target, key, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::LocalFileStore;
    use crate::clock::ManualClock;
    use crate::content::{ContentError, MemoryRepository, Record};
    use crate::index::SettingsIndex;
    use crate::settings::MemorySettings;
    use crate::snapshot::SnapshotEngine;
    use tempfile::TempDir;

    fn record(id: u64, body: &str) -> Record {
        Record {
            id: RecordId::from(id),
            kind: "snippet".into(),
            title: format!("Snippet {}", id),
            body: body.into(),
            status: "publish".into(),
            slug: format!("snippet-{}", id),
        }
    }

    struct Setup {
        _temp: TempDir,
        repo: Arc<MemoryRepository>,
        archives: ArchiveStore,
        index: Arc<dyn VersionIndex>,
        version: Version,
    }

    impl Setup {
        fn reconciler(&self) -> RestoreReconciler {
            self.reconciler_with(self.repo.clone())
        }

        fn reconciler_with(&self, repo: Arc<dyn ContentRepository>) -> RestoreReconciler {
            RestoreReconciler::new(
                repo,
                self.archives.clone(),
                self.index.clone(),
                "snippet",
                "_snippet_type",
            )
        }
    }

    /// Three snippets captured into one version.
    fn setup() -> Setup {
        let temp = TempDir::new().unwrap();
        let repo = Arc::new(MemoryRepository::new());
        let mut attrs = AttributeSet::new();
        attrs.add("_snippet_type", "js");
        attrs.add("_loc", "footer");
        attrs.add("_loc", "footer");
        repo.insert(record(1, "a"), attrs);
        repo.insert(record(2, "b"), AttributeSet::new());
        repo.insert(record(3, "c"), AttributeSet::new());

        let archives = ArchiveStore::new(Arc::new(LocalFileStore::new(temp.path())));
        let index: Arc<dyn VersionIndex> = Arc::new(SettingsIndex::new(MemorySettings::new()));
        let version = SnapshotEngine::new(
            repo.clone(),
            archives.clone(),
            index.clone(),
            Arc::new(ManualClock::at_unix(1_700_000_000)),
            "snippet",
        )
        .create_version(Some("base"))
        .unwrap();

        Setup {
            _temp: temp,
            repo,
            archives,
            index,
            version,
        }
    }

    #[test]
    fn test_inspect_classification() {
        let s = setup();
        s.repo
            .update(&RecordId::from(2), &RecordFields::from_snapshot(
                &record(2, "edited").to_snapshot(AttributeSet::new()),
                "snippet",
            ))
            .unwrap();
        s.repo.remove(&RecordId::from(3));

        let inspection = s.reconciler().inspect(&s.version.id).unwrap();
        let states: Vec<_> = inspection.records.iter().map(|r| r.state).collect();

        assert_eq!(
            states,
            vec![RecordState::Identical, RecordState::Changed, RecordState::Deleted]
        );
        assert_eq!(inspection.records[0].type_label, "JS");
        assert_eq!(inspection.records[1].type_label, DEFAULT_TYPE_LABEL);
        assert_eq!(inspection.records[2].action, "Deleted (Will create new)");
    }

    #[test]
    fn test_other_kind_at_same_id_is_deleted() {
        let s = setup();
        let mut page = record(1, "a");
        page.kind = "page".into();
        s.repo.insert(page, AttributeSet::new());

        let inspection = s.reconciler().inspect(&s.version.id).unwrap();
        assert_eq!(inspection.records[0].state, RecordState::Deleted);
    }

    #[test]
    fn test_restore_replaces_attributes_exactly() {
        let s = setup();
        let id = RecordId::from(1);
        s.repo.add_attribute(&id, "_extra", "x").unwrap();
        s.repo.delete_attribute(&id, "_loc").unwrap();

        let report = s
            .reconciler()
            .classify_and_restore(&s.version.id, &[id.clone()])
            .unwrap();

        assert_eq!(report.updated, vec![id.clone()]);
        let attrs = s.repo.list_attributes(&id).unwrap();
        assert!(!attrs.contains_key("_extra"));
        assert_eq!(attrs.get("_loc").unwrap(), &["footer", "footer"]);
        assert_eq!(attrs.first("_snippet_type"), Some("js"));
    }

    #[test]
    fn test_deleted_record_is_recreated() {
        let s = setup();
        s.repo.remove(&RecordId::from(3));

        let report = s
            .reconciler()
            .classify_and_restore(&s.version.id, &[RecordId::from(3)])
            .unwrap();

        assert_eq!(report.processed(), 1);
        let created = &report.created[0];
        assert_eq!(created.archived_id, RecordId::from(3));
        assert_ne!(created.new_id, RecordId::from(3));
        let live = s.repo.get(&created.new_id).unwrap().unwrap();
        assert_eq!(live.body, "c");
        assert_eq!(live.kind, "snippet");
    }

    #[test]
    fn test_unknown_and_duplicate_selection() {
        let s = setup();
        let report = s
            .reconciler()
            .classify_and_restore(
                &s.version.id,
                &[RecordId::from(2), RecordId::from(99), RecordId::from(2)],
            )
            .unwrap();

        assert_eq!(report.updated, vec![RecordId::from(2)]);
        assert_eq!(report.not_in_archive, vec![RecordId::from(99)]);
        assert!(report.partial_failure().is_none());
    }

    #[test]
    fn test_empty_inputs_are_noops() {
        let s = setup();
        let r = s.reconciler();
        assert_eq!(r.classify_and_restore("", &[RecordId::from(1)]).unwrap().processed(), 0);
        assert_eq!(r.classify_and_restore(&s.version.id, &[]).unwrap().processed(), 0);
    }

    #[test]
    fn test_missing_version_and_archive() {
        let s = setup();
        let r = s.reconciler();
        assert!(matches!(
            r.classify_and_restore("nope", &[RecordId::from(1)]),
            Err(VaultError::NotFound(_))
        ));

        s.archives.delete(&s.version).unwrap();
        assert!(matches!(r.inspect(&s.version.id), Err(VaultError::ArchiveMissing { .. })));
    }

    /// Delegates to a memory repository but refuses attribute writes.
    struct NoAttributeWrites(Arc<MemoryRepository>);

    impl ContentRepository for NoAttributeWrites {
        fn list_all(&self, kind: &str) -> ContentResult<Vec<Record>> {
            self.0.list_all(kind)
        }
        fn get(&self, id: &RecordId) -> ContentResult<Option<Record>> {
            self.0.get(id)
        }
        fn create(&self, fields: &RecordFields) -> ContentResult<RecordId> {
            self.0.create(fields)
        }
        fn update(&self, id: &RecordId, fields: &RecordFields) -> ContentResult<()> {
            self.0.update(id, fields)
        }
        fn list_attributes(&self, id: &RecordId) -> ContentResult<AttributeSet> {
            self.0.list_attributes(id)
        }
        fn delete_attribute(&self, id: &RecordId, key: &str) -> ContentResult<()> {
            self.0.delete_attribute(id, key)
        }
        fn add_attribute(&self, _id: &RecordId, _key: &str, _value: &str) -> ContentResult<()> {
            Err(ContentError::Rejected("attributes are read-only".into()))
        }
    }

    #[test]
    fn test_attribute_failure_counts_as_failed() {
        let s = setup();
        let r = s.reconciler_with(Arc::new(NoAttributeWrites(s.repo.clone())));

        let report = r
            .classify_and_restore(&s.version.id, &[RecordId::from(1), RecordId::from(2)])
            .unwrap();

        // Record 2 has no attributes to add
        assert_eq!(report.updated, vec![RecordId::from(2)]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, RecordId::from(1));
        assert!(matches!(
            report.partial_failure(),
            Some(VaultError::PartialFailure { succeeded: 1, failed: 1 })
        ));
    }
}
