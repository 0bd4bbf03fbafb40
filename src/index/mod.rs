//! Version index
//!
//! The index maps version id → version metadata and is the single source of
//! truth for which archives exist. Every mutation is a read-modify-write of
//! the whole mapping, executed as one critical section through
//! [`VersionIndex::modify`].

mod settings_index;
mod version;

pub use settings_index::SettingsIndex;
pub use version::{Version, VersionStatus};

use std::collections::BTreeMap;
use thiserror::Error;

use crate::settings::SettingsError;

/// Whole index document, keyed by version id.
pub type VersionMap = BTreeMap<String, Version>;

/// Index result type
pub type IndexResult<T> = Result<T, IndexError>;

/// Errors from index operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("settings store error: {0}")]
    Settings(#[from] SettingsError),

    #[error("index document is corrupt: {0}")]
    Corrupt(String),
}

/// Persisted version index.
pub trait VersionIndex: Send + Sync {
    /// Snapshot of the whole mapping.
    fn load(&self) -> IndexResult<VersionMap>;

    /// Run `f` over the mapping as one critical section and persist the result.
    fn modify(&self, f: &mut dyn FnMut(&mut VersionMap)) -> IndexResult<()>;

    /// All versions, newest first.
    fn list(&self) -> IndexResult<Vec<Version>> {
        let mut versions: Vec<Version> = self.load()?.into_values().collect();
        sort_newest_first(&mut versions);
        Ok(versions)
    }

    fn get(&self, id: &str) -> IndexResult<Option<Version>> {
        Ok(self.load()?.remove(id))
    }

    /// Insert or replace a version.
    fn put(&self, version: Version) -> IndexResult<()> {
        let mut pending = Some(version);
        self.modify(&mut |map| {
            if let Some(version) = pending.take() {
                map.insert(version.id.clone(), version);
            }
        })
    }

    /// Remove a version, returning it if it was present.
    fn remove(&self, id: &str) -> IndexResult<Option<Version>> {
        let mut removed = None;
        self.modify(&mut |map| removed = map.remove(id))?;
        Ok(removed)
    }
}

/// Order by timestamp descending; same-second ties by id descending.
pub fn sort_newest_first(versions: &mut [Version]) {
    versions.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.id.cmp(&a.id))
    });
}
