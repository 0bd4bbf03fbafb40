//! snapvault - versioned snapshots of a content collection
//!
//! Captures every record of one managed kind into an immutable JSON archive,
//! keeps a version index with trash and retention, and restores selected
//! records back into the live collection.

pub mod archive;
pub mod clock;
pub mod config;
pub mod content;
pub mod error;
pub mod index;
pub mod lifecycle;
pub mod notice;
pub mod persist;
pub mod restore;
pub mod settings;
pub mod snapshot;
pub mod vault;

pub use archive::{ArchiveStore, FileStore, LocalFileStore};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, VaultConfig};
pub use content::{ContentRepository, FileRepository, MemoryRepository, Record, RecordFields};
pub use error::{VaultError, VaultResult};
pub use index::{SettingsIndex, Version, VersionIndex, VersionStatus};
pub use lifecycle::{BulkTrashReport, CleanupReport, LifecycleManager, RetentionPolicy};
pub use notice::{Notice, NoticeKind};
pub use restore::{CreatedRecord, Inspection, RecordState, RestoreReconciler, RestoreReport};
pub use settings::{FileSettings, MemorySettings, SettingsStore};
pub use snapshot::SnapshotEngine;
pub use vault::{Vault, VaultParts};

pub use snapvault_archive::{content_hash, Archive, AttributeSet, RecordId, RecordSnapshot};
