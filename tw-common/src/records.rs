//! Schema-less lookup into heterogeneous warehouse records
//!
//! Warehouse unit records arrive as loosely structured JSON where almost
//! every field may be missing. All field access goes through these helpers so
//! a partial record degrades to an empty value instead of an error.

use serde_json::Value;

/// Walk `path` down through nested objects, returning the value at the end
/// of the path if every key exists.
pub fn lookup<'a>(record: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut level = record;
    for key in path {
        level = level.get(key)?;
    }
    Some(level)
}

/// True if every key along `path` exists in `record`.
pub fn path_exists(record: &Value, path: &[&str]) -> bool {
    lookup(record, path).is_some()
}

/// Look up a string field, defaulting to `""` when the path is missing or
/// the value is not a string.
pub fn lookup_str<'a>(record: &'a Value, path: &[&str]) -> &'a str {
    lookup(record, path).and_then(Value::as_str).unwrap_or("")
}
