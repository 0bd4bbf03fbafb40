//! Version index stored under one settings key.

use serde_json::Value;

use super::{IndexError, IndexResult, VersionIndex, VersionMap};
use crate::settings::{SettingsError, SettingsStore};

/// Settings key used when none is configured.
pub const DEFAULT_INDEX_KEY: &str = "version_index";

/// [`VersionIndex`] persisted as a JSON object in a [`SettingsStore`].
#[derive(Debug)]
pub struct SettingsIndex<S> {
    store: S,
    key: String,
}

impl<S: SettingsStore> SettingsIndex<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_INDEX_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Decode a stored index document. Unset, null and `[]` all mean "empty".
fn decode(value: Option<Value>) -> Result<VersionMap, String> {
    match value {
        None | Some(Value::Null) => Ok(VersionMap::new()),
        Some(Value::Array(items)) if items.is_empty() => Ok(VersionMap::new()),
        Some(value @ Value::Object(_)) => serde_json::from_value(value).map_err(|e| e.to_string()),
        Some(other) => Err(format!("expected an object, found {}", type_name(&other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl<S: SettingsStore> VersionIndex for SettingsIndex<S> {
    fn load(&self) -> IndexResult<VersionMap> {
        decode(self.store.get(&self.key)?).map_err(IndexError::Corrupt)
    }

    fn modify(&self, f: &mut dyn FnMut(&mut VersionMap)) -> IndexResult<()> {
        let key = self.key.clone();
        let result = self.store.update(&self.key, &mut |current| {
            let mut map = decode(current).map_err(|reason| SettingsError::Invalid {
                key: key.clone(),
                reason,
            })?;
            f(&mut map);
            Ok(serde_json::to_value(&map)?)
        });

        match result {
            Ok(_) => Ok(()),
            Err(SettingsError::Invalid { reason, .. }) => Err(IndexError::Corrupt(reason)),
            Err(e) => Err(IndexError::Settings(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Version;
    use crate::settings::{FileSettings, MemorySettings};
    use chrono::{DateTime, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let index = SettingsIndex::new(MemorySettings::new());
        assert!(index.list().unwrap().is_empty());
        assert!(index.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_put_get_remove() {
        let index = SettingsIndex::new(MemorySettings::new());
        let v = Version::new("first", "v_1.json", 2, at(10));
        let id = v.id.clone();

        index.put(v.clone()).unwrap();
        assert_eq!(index.get(&id).unwrap(), Some(v.clone()));

        assert_eq!(index.remove(&id).unwrap(), Some(v));
        assert!(index.get(&id).unwrap().is_none());
        assert!(index.remove(&id).unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let index = SettingsIndex::new(MemorySettings::new());
        for (desc, ts) in [("old", 10), ("new", 30), ("mid", 20)] {
            index.put(Version::new(desc, format!("{}.json", desc), 0, at(ts))).unwrap();
        }

        let order: Vec<_> = index
            .list()
            .unwrap()
            .into_iter()
            .map(|v| v.description)
            .collect();
        assert_eq!(order, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_legacy_empty_array_is_empty_index() {
        let settings = MemorySettings::new();
        settings.set(DEFAULT_INDEX_KEY, json!([])).unwrap();
        let index = SettingsIndex::new(settings);

        assert!(index.list().unwrap().is_empty());
        index.put(Version::new("x", "x.json", 0, at(1))).unwrap();
        assert_eq!(index.list().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_document_is_not_reset() {
        let settings = MemorySettings::new();
        settings.set(DEFAULT_INDEX_KEY, json!("garbage")).unwrap();
        let index = SettingsIndex::new(settings);

        assert!(matches!(index.list(), Err(IndexError::Corrupt(_))));
        let err = index.put(Version::new("x", "x.json", 0, at(1))).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(_)));
        assert_eq!(
            index.store().get(DEFAULT_INDEX_KEY).unwrap(),
            Some(json!("garbage"))
        );
    }

    #[test]
    fn test_persists_through_settings_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let v = Version::new("persisted", "v_9.json", 4, at(99));
        SettingsIndex::new(FileSettings::new(&path)).put(v.clone()).unwrap();

        let reopened = SettingsIndex::new(FileSettings::new(&path));
        assert_eq!(reopened.get(&v.id).unwrap(), Some(v));
    }

    #[test]
    fn test_custom_key() {
        let index = SettingsIndex::with_key(MemorySettings::new(), "snapshots");
        index.put(Version::new("x", "x.json", 0, at(1))).unwrap();
        assert_eq!(index.key(), "snapshots");
        assert!(index.store().get("snapshots").unwrap().is_some());
    }
}
