//! Cache Key Module
//!
//! Builds cache keys from a resource URL and its filter parameters.
//!
//! Filters are serialized in canonical form (object keys sorted at every
//! depth), so two filter objects holding the same values map to the same key
//! regardless of the order their fields were inserted in.

use serde_json::{Map, Value};

/// Returns the cache key for a GET of `url` with `filters`.
///
/// `null` and empty-object filters produce the bare URL.
pub fn request_key(url: &str, filters: &Value) -> String {
    match filters {
        Value::Null => url.to_string(),
        Value::Object(map) if map.is_empty() => url.to_string(),
        other => format!("{}?{}", url, canonical(other)),
    }
}

/// Rebuilds `value` with object keys in sorted order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

fn canonical(value: &Value) -> String {
    canonicalize(value).to_string()
}
