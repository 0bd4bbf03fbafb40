//! Record snapshots and the archive document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::attributes::AttributeSet;
use crate::error::ArchiveFormatError;
use crate::id::RecordId;

/// Point-in-time copy of one record.
///
/// Field names on disk follow the established archive layout
/// (`ID`, `post_title`, `post_content`, `post_status`, `post_name`, `meta`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    /// Identifier of the record at capture time
    #[serde(rename = "ID")]
    pub id: RecordId,

    #[serde(rename = "post_title", default)]
    pub title: String,

    /// Document body
    #[serde(rename = "post_content", default)]
    pub body: String,

    /// Publication status (publish, draft, private, ...)
    #[serde(rename = "post_status", default)]
    pub status: String,

    /// Slug / machine name
    #[serde(rename = "post_name", default)]
    pub slug: String,

    /// Complete attribute set
    #[serde(rename = "meta", default)]
    pub attributes: AttributeSet,
}

impl RecordSnapshot {
    /// Content hash of the archived body.
    pub fn body_hash(&self) -> String {
        crate::content_hash(&self.body)
    }
}

/// Immutable archive: the ordered list of snapshots captured by one version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Archive {
    records: Vec<RecordSnapshot>,
}

impl Archive {
    pub fn new(records: Vec<RecordSnapshot>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RecordSnapshot] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Index snapshots by identifier. A later duplicate replaces an earlier one.
    pub fn index_by_id(&self) -> HashMap<&RecordId, &RecordSnapshot> {
        self.records.iter().map(|r| (&r.id, r)).collect()
    }

    /// Encode as compact UTF-8 JSON.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ArchiveFormatError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode from UTF-8 JSON bytes.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ArchiveFormatError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ArchiveFormatError::Utf8)?;
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: u64, body: &str) -> RecordSnapshot {
        RecordSnapshot {
            id: RecordId::from(id),
            title: format!("Snippet {}", id),
            body: body.to_string(),
            status: "publish".to_string(),
            slug: format!("snippet-{}", id),
            attributes: [("_snippet_type", "php")].into_iter().collect(),
        }
    }

    #[test]
    fn test_reads_legacy_export() {
        let legacy = r#"[
            {"ID":12,"post_title":"Header","post_content":"<script></script>",
             "post_status":"publish","post_name":"header",
             "meta":{"_snippet_type":["html"],"_tags":["a","a"]}},
            {"ID":13,"post_title":"Bare","post_content":"","post_status":"draft",
             "post_name":"bare","meta":[]}
        ]"#;

        let archive = Archive::from_json_slice(legacy.as_bytes()).unwrap();
        assert_eq!(archive.len(), 2);

        let first = &archive.records()[0];
        assert_eq!(first.id, RecordId::from(12));
        assert_eq!(first.attributes.get("_tags").unwrap(), &["a", "a"]);
        assert!(archive.records()[1].attributes.is_empty());
    }

    #[test]
    fn test_writes_established_field_names() {
        let archive = Archive::new(vec![snapshot(7, "echo 1;")]);
        let value: serde_json::Value =
            serde_json::from_slice(&archive.to_json_bytes().unwrap()).unwrap();

        let record = &value[0];
        assert_eq!(record["ID"], 7);
        assert_eq!(record["post_title"], "Snippet 7");
        assert_eq!(record["post_content"], "echo 1;");
        assert_eq!(record["post_status"], "publish");
        assert_eq!(record["post_name"], "snippet-7");
        assert_eq!(record["meta"]["_snippet_type"][0], "php");
    }

    #[test]
    fn test_index_last_duplicate_wins() {
        let archive = Archive::new(vec![snapshot(1, "old"), snapshot(2, "x"), snapshot(1, "new")]);
        let index = archive.index_by_id();
        assert_eq!(index.len(), 2);
        assert_eq!(index[&RecordId::from(1)].body, "new");
    }

    #[test]
    fn test_rejects_non_utf8() {
        let err = Archive::from_json_slice(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, ArchiveFormatError::Utf8));
    }

    #[test]
    fn test_rejects_truncated_document() {
        let err = Archive::from_json_slice(br#"[{"ID":1,"#).unwrap_err();
        assert!(matches!(err, ArchiveFormatError::Json(_)));
    }
}
