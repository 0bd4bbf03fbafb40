//! Attribute multimap.
//!
//! Attributes have no fixed schema: every key maps to an ordered list of
//! opaque values and the same value may appear more than once. Keys unknown
//! to this crate are carried verbatim. Keys keep the order they were first
//! added in, both in memory and on disk; equality ignores key order.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Ordered multimap of attribute key to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeSet(IndexMap<String, Vec<String>>);

impl AttributeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to `key`, keeping any values already present.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Values stored under `key`, in insertion order.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// First value stored under `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    /// Remove every value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate `(key, values)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (key, value) in iter {
            set.add(key, value);
        }
        set
    }
}

/// Wire shapes accepted for an attribute set.
///
/// Exporters that encode an empty map as a JSON list produce `[]` for records
/// without attributes.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAttributes {
    Map(IndexMap<String, Vec<String>>),
    EmptyList([(); 0]),
}

impl<'de> Deserialize<'de> for AttributeSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawAttributes::deserialize(deserializer)? {
            RawAttributes::Map(map) => Ok(Self(map)),
            RawAttributes::EmptyList(_) => Ok(Self::new()),
        }
    }
}
