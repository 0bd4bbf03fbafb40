//! Durable file primitives shared by the file-backed stores.

mod lock;

pub use lock::{FileLock, LockError, LockResult};

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Temp file name next to `target`, unique per process and instant.
fn temp_path_for(target: &Path) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".tmp.{}.{}.{}", name, std::process::id(), stamp))
}

/// Write `bytes` to `target` via write-to-temp-then-rename.
///
/// Readers see either the old document or the complete new one.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp_path = temp_path_for(target);

    let result = (|| {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, target)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Like [`write_atomic`], but refuses to replace an existing file.
///
/// The complete temp file is hard-linked into place, so the final step
/// fails with `AlreadyExists` instead of overwriting.
pub fn write_new_atomic(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let temp_path = temp_path_for(target);

    let result = (|| {
        let mut file = File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::hard_link(&temp_path, target)
    })();

    let _ = fs::remove_file(&temp_path);
    result
}

/// Read a file, mapping "not found" to `None`.
pub fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Remove a file, treating absence as success. Returns whether a file was removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
