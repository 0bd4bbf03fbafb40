//! Shared helpers for the integration tests.
//!
//! - `TestVault`: an in-memory vault on a manual clock with a temp archive dir
//! - File store doubles that fail on demand
//! - Record builders

#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use snapvault::{
    AttributeSet, FileStore, LocalFileStore, ManualClock, MemoryRepository, MemorySettings,
    Record, RecordId, RetentionPolicy, SettingsIndex, Vault, VaultParts, VersionIndex,
};
use tempfile::TempDir;

/// 2023-11-14 22:13:20 UTC
pub const START: i64 = 1_700_000_000;

/// Path to a file under tests/fixtures
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

pub fn snippet(id: u64, title: &str, body: &str) -> Record {
    Record {
        id: RecordId::from(id),
        kind: "snippet".to_string(),
        title: title.to_string(),
        body: body.to_string(),
        status: "publish".to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
    }
}

pub fn attributes(pairs: &[(&str, &str)]) -> AttributeSet {
    pairs.iter().copied().collect()
}

/// Vault over an in-memory repository and index, archives in a temp dir.
pub struct TestVault {
    pub temp: TempDir,
    pub vault: Vault,
    pub repo: Arc<MemoryRepository>,
    pub index: Arc<dyn VersionIndex>,
    pub clock: Arc<ManualClock>,
    pub archive_dir: PathBuf,
}

impl TestVault {
    pub fn new() -> Self {
        Self::build(|dir| Arc::new(LocalFileStore::new(dir)) as Arc<dyn FileStore>)
    }

    /// Build with a custom file store rooted at the archive dir.
    pub fn build(files: impl FnOnce(PathBuf) -> Arc<dyn FileStore>) -> Self {
        let temp = TempDir::new().unwrap();
        let archive_dir = temp.path().join("versions");
        let repo = Arc::new(MemoryRepository::new());
        let index: Arc<dyn VersionIndex> = Arc::new(SettingsIndex::new(MemorySettings::new()));
        let clock = Arc::new(ManualClock::at_unix(START));

        let vault = Vault::with_parts(VaultParts {
            index: index.clone(),
            files: files(archive_dir.clone()),
            repo: repo.clone(),
            clock: clock.clone(),
            policy: RetentionPolicy::default(),
            managed_kind: "snippet".to_string(),
            type_attribute: "_snippet_type".to_string(),
        });

        Self {
            temp,
            vault,
            repo,
            index,
            clock,
            archive_dir,
        }
    }

    pub fn archive_file(&self, filename: &str) -> PathBuf {
        self.archive_dir.join(filename)
    }
}

/// Local store whose deletes fail for selected file names.
pub struct FlakyDeletes {
    inner: LocalFileStore,
    failing: Mutex<HashSet<String>>,
}

impl FlakyDeletes {
    pub fn new(root: PathBuf) -> Self {
        Self {
            inner: LocalFileStore::new(root),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_delete_of(&self, name: &str) {
        self.failing.lock().unwrap().insert(name.to_string());
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }
}

impl FileStore for FlakyDeletes {
    fn ensure_ready(&self) -> io::Result<()> {
        self.inner.ensure_ready()
    }

    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        self.inner.write(name, bytes)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.inner.read(name)
    }

    fn exists(&self, name: &str) -> bool {
        self.inner.exists(name)
    }

    fn delete(&self, name: &str) -> io::Result<bool> {
        if self.failing.lock().unwrap().contains(name) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "delete refused"));
        }
        self.inner.delete(name)
    }
}

/// Store that cannot accept writes.
pub struct ReadOnlyStore;

impl FileStore for ReadOnlyStore {
    fn ensure_ready(&self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"))
    }

    fn write(&self, _name: &str, _bytes: &[u8]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"))
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }

    fn exists(&self, _name: &str) -> bool {
        false
    }

    fn delete(&self, _name: &str) -> io::Result<bool> {
        Ok(false)
    }
}
