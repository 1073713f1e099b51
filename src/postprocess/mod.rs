//! Post-processing merger
//!
//! Folds the accumulated `(fingerprint -> raw bytes)` map and the per-call
//! key metadata into one normalized JSON document: each payload fragment
//! is extracted by its source dotted path and re-inserted under its target
//! path, success and error branches kept apart until the final collapse.

use crate::error::Result;
use crate::jsonpath::{extract, insert, split_path};
use crate::request::{Fingerprint, ResponseMap};
use crate::types::{JsonObject, JsonValue, KeyRecord};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Collision policy when the error branch folds into the success branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Error branch wins on key collisions
    #[default]
    ErrorWins,
    /// Success branch is preserved on key collisions
    PreserveSuccess,
}

/// Default post-process with the default collision policy.
pub fn default_json_post_process(
    responses: &ResponseMap,
    json_keys: &[KeyRecord],
) -> Result<Vec<u8>> {
    default_json_post_process_with_policy(responses, json_keys, MergePolicy::default())
}

/// Walk the response map, rekey every fragment, and collapse the result.
pub fn default_json_post_process_with_policy(
    responses: &ResponseMap,
    json_keys: &[KeyRecord],
    policy: MergePolicy,
) -> Result<Vec<u8>> {
    let mut json_keys: Vec<KeyRecord> = json_keys.to_vec();
    let mut items_patched: HashSet<String> = HashSet::new();

    let mut parsed_structure = JsonValue::Object(JsonObject::new());
    let mut parsed_error_structure = JsonValue::Object(JsonObject::new());

    for (fingerprint, payload) in responses {
        for document in parse_documents(payload) {
            // A top-level list has no keys to extract by; wrap it and
            // point the call's base keys at the synthetic "items" root.
            let document = if document.is_array() {
                patch_keys_for_list(&mut json_keys, &fingerprint.uuid, &mut items_patched);
                let mut wrapper = JsonObject::new();
                wrapper.insert("items".to_string(), document);
                JsonValue::Object(wrapper)
            } else {
                document
            };

            (parsed_structure, parsed_error_structure) = rekey_document(
                fingerprint,
                &json_keys,
                &document,
                parsed_structure,
                parsed_error_structure,
            );
        }
    }

    collapse_json(&parsed_structure, &parsed_error_structure, policy)
}

/// Parse an accumulated payload as a stream of JSON documents.
///
/// Pages accumulate by raw byte concatenation, so a multi-page payload
/// reads `{…}{…}`; every complete document in the stream contributes.
fn parse_documents(payload: &[u8]) -> Vec<JsonValue> {
    let mut documents = Vec::new();
    for parsed in serde_json::Deserializer::from_slice(payload).into_iter::<JsonValue>() {
        match parsed {
            Ok(document) => documents.push(document),
            Err(e) => {
                warn!("Skipping unparseable response fragment: {e}");
                break;
            }
        }
    }
    documents
}

/// Prepend `items.` to every base key of the first record matching the
/// call's UUID, once per call.
fn patch_keys_for_list(json_keys: &mut [KeyRecord], uuid: &str, patched: &mut HashSet<String>) {
    if !patched.insert(uuid.to_string()) {
        return;
    }
    for record in json_keys.iter_mut() {
        if record.get("api_call_uuid").map(String::as_str) != Some(uuid) {
            continue;
        }
        let key_count: usize = record
            .get("key_count")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        for i in 0..key_count {
            let key = format!("current_base_key_{i}");
            let patched_value = match record.get(&key).map(String::as_str) {
                Some("") | None => "items".to_string(),
                Some(existing) => format!("items.{existing}"),
            };
            record.insert(key, patched_value);
        }
        // Duplicate names do happen with sub-endpoints; their records
        // carry the same keys, so patching the first one is enough.
        break;
    }
}

/// Rekey one response document through every key record matching its call.
fn rekey_document(
    fingerprint: &Fingerprint,
    json_keys: &[KeyRecord],
    document: &JsonValue,
    mut parsed_structure: JsonValue,
    mut parsed_error_structure: JsonValue,
) -> (JsonValue, JsonValue) {
    let endpoint_key_values: HashMap<String, JsonValue> = if fingerprint.endpoint_key_values.is_empty()
    {
        HashMap::new()
    } else {
        serde_json::from_str(&fingerprint.endpoint_key_values).unwrap_or_default()
    };

    for record in json_keys {
        if record.get("api_call_uuid").map(String::as_str) != Some(fingerprint.uuid.as_str()) {
            continue;
        }
        let key_count: usize = record
            .get("key_count")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        for i in 0..key_count {
            let lookup = |name: &str| -> Vec<String> {
                split_path(record.get(&format!("{name}_{i}")).map_or("", String::as_str))
            };
            let current_base = lookup("current_base_key");
            let desired_base = lookup("desired_base_key");
            let current_error = lookup("current_error_key");
            let desired_error = lookup("desired_error_key");

            let mut fragment = extract(&current_base, document);
            overlay_key_values(&mut fragment, &endpoint_key_values);
            parsed_structure = insert(&desired_base, parsed_structure, fragment, true);

            // Error branches aren't always present; only chase them when
            // the top-level key actually exists in this response.
            let error_root_present = current_error
                .first()
                .is_some_and(|root| document.get(root).is_some());
            if error_root_present {
                let error_fragment = extract(&current_error, document);
                parsed_error_structure =
                    insert(&desired_error, parsed_error_structure, error_fragment, false);
            }
        }
    }

    (parsed_structure, parsed_error_structure)
}

/// Copy parent-derived attributes onto every object element of an
/// extracted fragment; scalar and list elements are left untouched.
fn overlay_key_values(fragment: &mut [JsonValue], key_values: &HashMap<String, JsonValue>) {
    if key_values.is_empty() {
        return;
    }
    for element in fragment.iter_mut() {
        if let JsonValue::Object(obj) = element {
            for (k, v) in key_values {
                obj.insert(k.clone(), v.clone());
            }
        }
    }
}

/// Collapse the success and error structures into one document.
pub fn collapse_json(
    returns: &JsonValue,
    errors: &JsonValue,
    policy: MergePolicy,
) -> Result<Vec<u8>> {
    let mut final_map = match returns {
        JsonValue::Object(map) => map.clone(),
        _ => JsonObject::new(),
    };
    if let JsonValue::Object(error_map) = errors {
        for (k, v) in error_map {
            match policy {
                MergePolicy::ErrorWins => {
                    final_map.insert(k.clone(), v.clone());
                }
                MergePolicy::PreserveSuccess => {
                    final_map.entry(k.clone()).or_insert_with(|| v.clone());
                }
            }
        }
    }
    Ok(serde_json::to_vec(&JsonValue::Object(final_map))?)
}

#[cfg(test)]
mod tests;
