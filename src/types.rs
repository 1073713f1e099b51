//! Common types used throughout the harvester
//!
//! Shared type aliases and small utility types used across modules.

use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

/// Key-value map where each key carries an ordered list of values
/// (parameter bags: querystring, header, body)
pub type MultiMap = HashMap<String, Vec<String>>;

/// One per-call key metadata record: `api_call_name`, `api_call_uuid`,
/// `key_count`, the numbered `current_base_key_i` / `desired_base_key_i`
/// pairs (and error equivalents), plus any endpoint vars.
pub type KeyRecord = HashMap<String, String>;

/// Runtime parameter overrides keyed by endpoint name, then by section
/// (`header` / `querystring` / `body`), then by parameter name.
pub type RuntimeParams = HashMap<String, HashMap<String, StringMap>>;

// ============================================================================
// Utilities
// ============================================================================

/// Format a float the way pagination indicators expect: decimal notation,
/// shortest representation, never an exponent.
pub fn format_float_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Turn a snake_case endpoint name into a human-readable label
/// (`list_user_groups` becomes `List User Groups`).
pub fn humanize(value: &str) -> String {
    let mut humanized = String::with_capacity(value.len());
    let mut upper_next = true;
    for ch in value.chars() {
        if ch == '_' || ch == ' ' {
            upper_next = true;
        } else if upper_next {
            if !humanized.is_empty() {
                humanized.push(' ');
            }
            humanized.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            humanized.push(ch);
        }
    }
    humanized
}
