//! JSON-document settings file.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{SettingsError, SettingsResult, SettingsStore};
use crate::persist::{read_optional, write_atomic, FileLock};

/// Settings persisted as one JSON object on disk.
///
/// Every access takes the document lock; writes go through a temp file and
/// rename so a crash never leaves a half-written document.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
    lock_timeout: Duration,
}

impl FileSettings {
    /// Default wait for the document lock.
    pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout: Self::DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> SettingsResult<Map<String, Value>> {
        match read_optional(&self.path)? {
            None => Ok(Map::new()),
            Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Map::new()),
            Some(bytes) => match serde_json::from_slice(&bytes)? {
                Value::Object(map) => Ok(map),
                _ => Err(SettingsError::NotAnObject),
            },
        }
    }

    fn store(&self, document: Map<String, Value>) -> SettingsResult<()> {
        let bytes = serde_json::to_vec_pretty(&Value::Object(document))?;
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> SettingsResult<Option<Value>> {
        let _lock = FileLock::acquire(&self.path, self.lock_timeout)?;
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> SettingsResult<()> {
        self.update(key, &mut |_| Ok(value.clone())).map(|_| ())
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<Value>) -> SettingsResult<Value>,
    ) -> SettingsResult<Value> {
        let _lock = FileLock::acquire(&self.path, self.lock_timeout)?;

        let mut document = self.load()?;
        let updated = f(document.get(key).cloned())?;
        document.insert(key.to_string(), updated.clone());
        self.store(document)?;

        Ok(updated)
    }
}
