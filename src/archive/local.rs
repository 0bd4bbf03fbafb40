//! Archive directory on the local (or network-mounted) filesystem.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::FileStore;
use crate::persist::{remove_if_exists, write_new_atomic};

/// Marker written into a freshly created archive directory so a web server
/// that happens to expose it refuses to serve the archives.
pub const ACCESS_DENIAL_MARKER: &str = ".htaccess";

const ACCESS_DENIAL_CONTENT: &str = "deny from all";

/// [`FileStore`] rooted at one directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored name, refusing anything that would escape the root.
    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let plain = Path::new(name)
            .file_name()
            .map(|n| n == std::ffi::OsStr::new(name))
            .unwrap_or(false);
        if name.is_empty() || !plain || name == "." || name == ".." {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid archive file name: {:?}", name),
            ));
        }
        Ok(self.root.join(name))
    }
}

impl FileStore for LocalFileStore {
    fn ensure_ready(&self) -> io::Result<()> {
        let created = !self.root.exists();
        fs::create_dir_all(&self.root)?;

        let marker = self.root.join(ACCESS_DENIAL_MARKER);
        if !marker.exists() {
            fs::write(&marker, ACCESS_DENIAL_CONTENT)?;
        }
        if created {
            info!(dir = %self.root.display(), "created archive directory");
        }
        Ok(())
    }

    fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        write_new_atomic(&self.resolve(name)?, bytes)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(name)?)
    }

    fn exists(&self, name: &str) -> bool {
        self.resolve(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn delete(&self, name: &str) -> io::Result<bool> {
        remove_if_exists(&self.resolve(name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_ready_creates_dir_and_marker() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("versions");
        let store = LocalFileStore::new(&root);

        store.ensure_ready().unwrap();

        assert!(root.is_dir());
        let marker = fs::read_to_string(root.join(ACCESS_DENIAL_MARKER)).unwrap();
        assert_eq!(marker, "deny from all");
    }

    #[test]
    fn test_write_once() {
        let temp = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp.path());

        store.write("v_1_aaaaaa.json", b"[]").unwrap();
        assert!(store.exists("v_1_aaaaaa.json"));
        assert_eq!(store.read("v_1_aaaaaa.json").unwrap(), b"[]");

        let err = store.write("v_1_aaaaaa.json", b"[1]").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_delete_is_best_effort() {
        let temp = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp.path());
        store.write("a.json", b"[]").unwrap();

        assert!(store.delete("a.json").unwrap());
        assert!(!store.delete("a.json").unwrap());
        assert!(!store.exists("a.json"));
    }

    #[test]
    fn test_rejects_path_traversal() {
        let temp = TempDir::new().unwrap();
        let store = LocalFileStore::new(temp.path().join("versions"));

        for bad in ["../settings.json", "sub/dir.json", "", ".."] {
            assert!(store.read(bad).is_err(), "{:?} should be rejected", bad);
            assert!(!store.exists(bad));
        }
    }
}
