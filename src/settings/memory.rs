//! In-process settings store.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{SettingsResult, SettingsStore};

/// Settings held in memory; the mutex is held across each update.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: Mutex<BTreeMap<String, Value>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> SettingsResult<Option<Value>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> SettingsResult<()> {
        self.values().insert(key.to_string(), value);
        Ok(())
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<Value>) -> SettingsResult<Value>,
    ) -> SettingsResult<Value> {
        let mut values = self.values();
        let updated = f(values.get(key).cloned())?;
        values.insert(key.to_string(), updated.clone());
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_sees_previous_value() {
        let settings = MemorySettings::new();
        settings.set("n", json!(1)).unwrap();

        let stored = settings
            .update("n", &mut |v| Ok(json!(v.and_then(|v| v.as_i64()).unwrap_or(0) + 1)))
            .unwrap();

        assert_eq!(stored, json!(2));
        assert_eq!(settings.get_or("missing", json!([])).unwrap(), json!([]));
    }
}
