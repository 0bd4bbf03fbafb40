//! Persistent key/value settings store
//!
//! The version index lives under a single settings key. Stores expose an
//! `update` primitive that runs a read-modify-write of one key as a critical
//! section, so two writers can never interleave on the same document.

mod file;
mod memory;

pub use file::FileSettings;
pub use memory::MemorySettings;

use serde_json::Value;
use std::io;
use thiserror::Error;

use crate::persist::LockError;

/// Settings result type
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors from settings store operations
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("settings document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    #[error("settings document is not a JSON object")]
    NotAnObject,

    /// Raised by an update closure that refused the stored value.
    #[error("invalid value for '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

/// Key/value store for small JSON settings documents.
pub trait SettingsStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> SettingsResult<Option<Value>>;

    /// Read `key`, falling back to `default` when unset.
    fn get_or(&self, key: &str, default: Value) -> SettingsResult<Value> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: Value) -> SettingsResult<()>;

    /// Atomically replace `key` with `f(current)`.
    ///
    /// No other writer observes or modifies the key while `f` runs. If `f`
    /// returns an error nothing is written. Returns the stored value.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<Value>) -> SettingsResult<Value>,
    ) -> SettingsResult<Value>;
}
