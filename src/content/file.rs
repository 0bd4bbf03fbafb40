//! Record collection persisted as one JSON document.
//!
//! Document layout:
//!
//! ```json
//! {
//!   "last_id": 42,
//!   "records": {
//!     "42": { "id": 42, "kind": "snippet", "title": "...", "body": "...",
//!             "status": "publish", "slug": "...", "attributes": { "k": ["v"] } }
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use snapvault_archive::{AttributeSet, RecordId};

use super::memory::CollectionState;
use super::{ContentRepository, ContentResult, Record, RecordFields};
use crate::persist::{read_optional, write_atomic, FileLock};

/// [`ContentRepository`] backed by a JSON file, locked for every access.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
    lock_timeout: Duration,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> ContentResult<CollectionState> {
        match read_optional(&self.path)? {
            None => Ok(CollectionState::default()),
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&CollectionState) -> ContentResult<T>) -> ContentResult<T> {
        let _lock = FileLock::acquire(&self.path, self.lock_timeout)?;
        f(&self.load()?)
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut CollectionState) -> ContentResult<T>,
    ) -> ContentResult<T> {
        let _lock = FileLock::acquire(&self.path, self.lock_timeout)?;
        let mut state = self.load()?;
        let out = f(&mut state)?;
        write_atomic(&self.path, &serde_json::to_vec_pretty(&state)?)?;
        Ok(out)
    }

    /// Seed a record with a fixed identifier.
    pub fn insert(&self, record: Record, attributes: AttributeSet) -> ContentResult<()> {
        self.write(|state| {
            state.insert(record, attributes);
            Ok(())
        })
    }
}

impl ContentRepository for FileRepository {
    fn list_all(&self, kind: &str) -> ContentResult<Vec<Record>> {
        self.read(|state| Ok(state.list_all(kind)))
    }

    fn get(&self, id: &RecordId) -> ContentResult<Option<Record>> {
        self.read(|state| Ok(state.get(id)))
    }

    fn create(&self, fields: &RecordFields) -> ContentResult<RecordId> {
        self.write(|state| Ok(state.create(fields)))
    }

    fn update(&self, id: &RecordId, fields: &RecordFields) -> ContentResult<()> {
        self.write(|state| state.update(id, fields))
    }

    fn list_attributes(&self, id: &RecordId) -> ContentResult<AttributeSet> {
        self.read(|state| state.list_attributes(id))
    }

    fn delete_attribute(&self, id: &RecordId, key: &str) -> ContentResult<()> {
        self.write(|state| state.delete_attribute(id, key))
    }

    fn add_attribute(&self, id: &RecordId, key: &str, value: &str) -> ContentResult<()> {
        self.write(|state| state.add_attribute(id, key, value))
    }
}
