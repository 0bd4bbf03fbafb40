//! Layer merging
//!
//! - Objects: merged key by key, recursively
//! - Arrays and scalars: the later layer replaces the earlier one

use serde_json::Value;

/// Merge `overlay` on top of `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                let combined = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, combined);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Merge layers in precedence order (first is the base, last wins).
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_later_layer_wins() {
        let result = merge_layers(vec![
            json!({"retention_days": 30, "managed_kind": "snippet"}),
            json!({"retention_days": 7}),
            json!({"retention_days": 1}),
        ]);
        assert_eq!(result["retention_days"], 1);
        assert_eq!(result["managed_kind"], "snippet");
    }

    #[test]
    fn test_nested_objects_merge() {
        let base = json!({"paths": {"archive": "versions", "settings": "settings.json"}});
        let overlay = json!({"paths": {"archive": "/srv/archives"}});
        let result = deep_merge(base, overlay);

        assert_eq!(result["paths"]["archive"], "/srv/archives");
        assert_eq!(result["paths"]["settings"], "settings.json");
    }

    #[test]
    fn test_arrays_replace() {
        let result = deep_merge(json!({"kinds": ["a", "b"]}), json!({"kinds": ["c"]}));
        assert_eq!(result["kinds"], json!(["c"]));
    }

    #[test]
    fn test_empty_overlay_keeps_base() {
        let result = deep_merge(json!({"a": 1}), json!({}));
        assert_eq!(result, json!({"a": 1}));
    }
}
