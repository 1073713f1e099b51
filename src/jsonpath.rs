//! Dotted key path utilities over JSON values
//!
//! Two operations drive the response rekeying pipeline: [`extract`] drills
//! into a JSON value by a dotted key path and returns the flattened list of
//! matched values, and [`insert`] adds a list of values at a dotted path,
//! creating intermediate objects as needed.
//!
//! Both are total over `serde_json::Value`: nodes that cannot be descended
//! into contribute nothing rather than failing.

use crate::types::{JsonObject, JsonValue};

/// Split a dotted path into its key segments.
///
/// An empty string yields a single empty segment, matching the convention
/// that an unset key path addresses nothing.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(str::to_string).collect()
}

/// Drill into `value` by the key segments in `path`, returning the flat
/// list of matched values.
///
/// At each step an object is descended by key; a list of objects maps the
/// remaining path over each element and concatenates the results. At the
/// final step a matched list is flattened into the output while a scalar
/// or object is appended as a single element. Missing keys, nulls, and
/// empty strings contribute nothing.
pub fn extract(path: &[String], value: &JsonValue) -> Vec<JsonValue> {
    if path.is_empty() {
        return Vec::new();
    }

    let objects: Vec<&JsonObject> = match value {
        JsonValue::Object(map) => vec![map],
        JsonValue::Array(items) => items.iter().filter_map(JsonValue::as_object).collect(),
        _ => Vec::new(),
    };

    let mut matched = Vec::new();
    for obj in objects {
        let Some(node) = obj.get(&path[0]) else {
            continue;
        };
        if path.len() == 1 {
            match node {
                JsonValue::Array(items) => matched.extend(items.iter().cloned()),
                JsonValue::Null => {}
                JsonValue::String(s) if s.is_empty() => {}
                other => matched.push(other.clone()),
            }
        } else if !node.is_null() {
            matched.extend(extract(&path[1..], node));
        }
    }
    matched
}

/// Insert `new_items` at `path` inside `into`, returning the updated
/// object.
///
/// Intermediate objects are created as needed; at the leaf the items are
/// appended to the existing list (or installed as the list if the key is
/// absent). With `force` false and no items to add the input is returned
/// unchanged, so error branches never materialize empty paths. A non-list
/// value already present at the leaf is wrapped into a list before
/// appending; a non-object intermediate node is a configuration mistake
/// and is replaced by a fresh object.
pub fn insert(path: &[String], into: JsonValue, new_items: Vec<JsonValue>, force: bool) -> JsonValue {
    if !force && new_items.is_empty() {
        return into;
    }
    if path.is_empty() {
        return into;
    }

    let mut map = match into {
        JsonValue::Object(map) => map,
        _ => JsonObject::new(),
    };
    let key = &path[0];

    if path.len() == 1 {
        match map.remove(key) {
            None => {
                map.insert(key.clone(), JsonValue::Array(new_items));
            }
            Some(existing) => {
                if new_items.is_empty() {
                    map.insert(key.clone(), existing);
                } else {
                    let mut list = match existing {
                        JsonValue::Array(items) => items,
                        other => vec![other],
                    };
                    list.extend(new_items);
                    map.insert(key.clone(), JsonValue::Array(list));
                }
            }
        }
    } else {
        match map.remove(key) {
            None => {
                let child = insert(
                    &path[1..],
                    JsonValue::Object(JsonObject::new()),
                    new_items,
                    force,
                );
                map.insert(key.clone(), child);
            }
            Some(existing) => {
                if new_items.is_empty() {
                    map.insert(key.clone(), existing);
                } else {
                    let child_base = match existing {
                        JsonValue::Object(_) => existing,
                        _ => JsonValue::Object(JsonObject::new()),
                    };
                    let child = insert(&path[1..], child_base, new_items, force);
                    map.insert(key.clone(), child);
                }
            }
        }
    }

    JsonValue::Object(map)
}
