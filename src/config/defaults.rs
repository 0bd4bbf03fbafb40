//! Built-in defaults (lowest configuration layer)

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Base directory for every relative path (default: "snapvault-data")
    pub data_dir: String,

    /// Archive directory (default: "versions")
    pub archive_dir: String,

    /// Settings document holding the version index (default: "settings.json")
    pub settings_path: String,

    /// Record collection used by the file-backed repository (default: "records.json")
    pub records_path: String,

    /// Settings key of the version index (default: "version_index")
    pub index_key: String,

    /// Record kind captured and restored (default: "snippet")
    pub managed_kind: String,

    /// Attribute whose first value labels a record's type (default: "_snippet_type")
    pub type_attribute: String,

    /// Days a trashed version survives before purge (default: 30)
    pub retention_days: u32,

    /// Wait for a document lock, in milliseconds (default: 5000)
    pub lock_timeout_ms: u64,

    /// Log filter when RUST_LOG is unset (default: "info")
    pub log_level: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            data_dir: "snapvault-data".to_string(),
            archive_dir: "versions".to_string(),
            settings_path: "settings.json".to_string(),
            records_path: "records.json".to_string(),
            index_key: "version_index".to_string(),
            managed_kind: "snippet".to_string(),
            type_attribute: "_snippet_type".to_string(),
            retention_days: 30,
            lock_timeout_ms: 5000,
            log_level: "info".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a JSON value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "data_dir": self.data_dir,
            "archive_dir": self.archive_dir,
            "settings_path": self.settings_path,
            "records_path": self.records_path,
            "index_key": self.index_key,
            "managed_kind": self.managed_kind,
            "type_attribute": self.type_attribute,
            "retention_days": self.retention_days,
            "lock_timeout_ms": self.lock_timeout_ms,
            "log_level": self.log_level,
        })
    }
}
