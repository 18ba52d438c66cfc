//! Document key sanitization
//!
//! The document store treats `.` in a field name as a path separator, so every
//! object key is rewritten with `.` → `_` before a write. Applies at every
//! depth, including objects nested inside arrays.

use serde_json::{Map, Value as JsonValue};

const PATH_SEPARATOR: char = '.';
const REPLACEMENT: &str = "_";

/// Rewrite all object keys in `document`. Idempotent.
///
/// If two keys of the same object collide after rewriting, the later one wins.
pub fn sanitize(document: JsonValue) -> JsonValue {
    match document {
        JsonValue::Object(map) => JsonValue::Object(sanitize_map(map)),
        JsonValue::Array(values) => JsonValue::Array(values.into_iter().map(sanitize).collect()),
        scalar => scalar,
    }
}

fn sanitize_map(map: Map<String, JsonValue>) -> Map<String, JsonValue> {
    map.into_iter()
        .map(|(key, value)| (sanitize_key(key), sanitize(value)))
        .collect()
}

fn sanitize_key(key: String) -> String {
    if key.contains(PATH_SEPARATOR) {
        key.replace(PATH_SEPARATOR, REPLACEMENT)
    } else {
        key
    }
}
