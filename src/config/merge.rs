//! Configuration merge logic
//!
//! Layers merge with:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (last wins)
//! - Scalars: override (last wins)

use serde_json::Value;

/// Deep merge two JSON values, `overlay` taking precedence.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }

        // arrays and scalars: overlay wins outright
        (_, overlay) => overlay,
    }
}

/// Merge layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_keys_survive_partial_override() {
        let base = json!({"polling": {"busy_seconds": 10, "task_seconds": 3}});
        let overlay = json!({"polling": {"busy_seconds": 30}});
        let result = deep_merge(base, overlay);

        assert_eq!(result["polling"]["busy_seconds"], 30);
        assert_eq!(result["polling"]["task_seconds"], 3);
    }

    #[test]
    fn test_arrays_are_replaced_not_concatenated() {
        // generic merge rule; no settings key holds an array today
        let base = json!({"list": ["a", "b"]});
        let overlay = json!({"list": ["c"]});
        let result = deep_merge(base, overlay);

        assert_eq!(result["list"], json!(["c"]));
    }

    #[test]
    fn test_new_sections_are_added() {
        let result = deep_merge(json!({"retention": {"keep": 3}}), json!({"server": {"url": "https://x"}}));

        assert_eq!(result["retention"]["keep"], 3);
        assert_eq!(result["server"]["url"], "https://x");
    }

    #[test]
    fn test_later_layers_win() {
        let builtin = json!({"server": {"user": "api", "timeout_seconds": 120}});
        let file = json!({"server": {"user": "admin", "url": "https://file"}});
        let env = json!({"server": {"url": "https://env"}});

        let result = merge_layers(vec![builtin, file, env]);

        assert_eq!(result["server"]["user"], "admin");
        assert_eq!(result["server"]["url"], "https://env");
        assert_eq!(result["server"]["timeout_seconds"], 120);
    }

    #[test]
    fn test_no_layers_is_null() {
        assert!(merge_layers(Vec::new()).is_null());
    }
}
