//! JSON tree helpers

use serde_json::Value;

/// Copy of `value` with every object key in `keys` removed at any depth
pub fn remove_keys(value: &Value, keys: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !keys.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), remove_keys(value, keys)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|item| remove_keys(item, keys)).collect()),
        other => other.clone(),
    }
}
