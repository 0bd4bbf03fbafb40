//! In-memory record collection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use snapvault_archive::{AttributeSet, RecordId};

use super::{ContentError, ContentRepository, ContentResult, Record, RecordFields};

/// A record and its attributes as stored by the built-in repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    #[serde(flatten)]
    pub record: Record,
    #[serde(default)]
    pub attributes: AttributeSet,
}

/// Whole collection state; shared by the memory and file repositories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CollectionState {
    /// Last identifier handed out by `create`
    #[serde(default)]
    pub last_id: u64,
    #[serde(default)]
    pub records: BTreeMap<RecordId, StoredRecord>,
}

impl CollectionState {
    fn stored_mut(&mut self, id: &RecordId) -> ContentResult<&mut StoredRecord> {
        self.records
            .get_mut(id)
            .ok_or_else(|| ContentError::NotFound(id.clone()))
    }

    /// Next numeric identifier above anything already used.
    fn next_id(&mut self) -> RecordId {
        let highest = self
            .records
            .keys()
            .filter_map(RecordId::as_number)
            .max()
            .unwrap_or(0);
        self.last_id = self.last_id.max(highest) + 1;
        RecordId::from(self.last_id)
    }

    pub fn insert(&mut self, record: Record, attributes: AttributeSet) {
        if let Some(n) = record.id.as_number() {
            self.last_id = self.last_id.max(n);
        }
        self.records
            .insert(record.id.clone(), StoredRecord { record, attributes });
    }

    pub fn remove(&mut self, id: &RecordId) -> Option<StoredRecord> {
        self.records.remove(id)
    }

    pub fn list_all(&self, kind: &str) -> Vec<Record> {
        self.records
            .values()
            .filter(|stored| stored.record.kind == kind)
            .map(|stored| stored.record.clone())
            .collect()
    }

    pub fn get(&self, id: &RecordId) -> Option<Record> {
        self.records.get(id).map(|stored| stored.record.clone())
    }

    pub fn create(&mut self, fields: &RecordFields) -> RecordId {
        let id = self.next_id();
        let record = Record {
            id: id.clone(),
            kind: fields.kind.clone(),
            title: fields.title.clone(),
            body: fields.body.clone(),
            status: fields.status.clone(),
            slug: fields.slug.clone(),
        };
        self.insert(record, AttributeSet::new());
        id
    }

    pub fn update(&mut self, id: &RecordId, fields: &RecordFields) -> ContentResult<()> {
        let record = &mut self.stored_mut(id)?.record;
        record.kind = fields.kind.clone();
        record.title = fields.title.clone();
        record.body = fields.body.clone();
        record.status = fields.status.clone();
        record.slug = fields.slug.clone();
        Ok(())
    }

    pub fn list_attributes(&self, id: &RecordId) -> ContentResult<AttributeSet> {
        self.records
            .get(id)
            .map(|stored| stored.attributes.clone())
            .ok_or_else(|| ContentError::NotFound(id.clone()))
    }

    pub fn delete_attribute(&mut self, id: &RecordId, key: &str) -> ContentResult<()> {
        self.stored_mut(id)?.attributes.remove(key);
        Ok(())
    }

    pub fn add_attribute(&mut self, id: &RecordId, key: &str, value: &str) -> ContentResult<()> {
        self.stored_mut(id)?.attributes.add(key, value);
        Ok(())
    }
}

/// Record collection held in memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<CollectionState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, CollectionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed a record with a fixed identifier.
    pub fn insert(&self, record: Record, attributes: AttributeSet) {
        self.state().insert(record, attributes);
    }

    /// Drop a record, as an editor deleting it from the live site would.
    pub fn remove(&self, id: &RecordId) -> Option<Record> {
        self.state().remove(id).map(|stored| stored.record)
    }
}

impl ContentRepository for MemoryRepository {
    fn list_all(&self, kind: &str) -> ContentResult<Vec<Record>> {
        Ok(self.state().list_all(kind))
    }

    fn get(&self, id: &RecordId) -> ContentResult<Option<Record>> {
        Ok(self.state().get(id))
    }

    fn create(&self, fields: &RecordFields) -> ContentResult<RecordId> {
        Ok(self.state().create(fields))
    }

    fn update(&self, id: &RecordId, fields: &RecordFields) -> ContentResult<()> {
        self.state().update(id, fields)
    }

    fn list_attributes(&self, id: &RecordId) -> ContentResult<AttributeSet> {
        self.state().list_attributes(id)
    }

    fn delete_attribute(&self, id: &RecordId, key: &str) -> ContentResult<()> {
        self.state().delete_attribute(id, key)
    }

    fn add_attribute(&self, id: &RecordId, key: &str, value: &str) -> ContentResult<()> {
        self.state().add_attribute(id, key, value)
    }
}
