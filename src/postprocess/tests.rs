//! Tests for the post-processing merger

use super::*;
use crate::request::Fingerprint;
use chrono::{DateTime, Utc};
use serde_json::json;

fn fingerprint(name: &str, uuid: &str) -> Fingerprint {
    Fingerprint {
        name: name.to_string(),
        uuid: uuid.to_string(),
        endpoint: format!("https://api/{name}"),
        endpoint_key_values: String::new(),
        attempt_time: DateTime::<Utc>::MIN_UTC,
        time: DateTime::<Utc>::MIN_UTC,
        response_code: 200,
    }
}

fn record(name: &str, uuid: &str, base_pairs: &[(&str, &str)], error_pairs: &[(&str, &str)]) -> KeyRecord {
    let mut rec = KeyRecord::new();
    rec.insert("api_call_name".to_string(), name.to_string());
    rec.insert("api_call_uuid".to_string(), uuid.to_string());
    rec.insert("key_count".to_string(), base_pairs.len().to_string());
    for (i, (current, desired)) in base_pairs.iter().enumerate() {
        rec.insert(format!("current_base_key_{i}"), (*current).to_string());
        rec.insert(format!("desired_base_key_{i}"), (*desired).to_string());
    }
    for (i, (current, desired)) in error_pairs.iter().enumerate() {
        rec.insert(format!("current_error_key_{i}"), (*current).to_string());
        rec.insert(format!("desired_error_key_{i}"), (*desired).to_string());
    }
    rec
}

fn parse(bytes: &[u8]) -> JsonValue {
    serde_json::from_slice(bytes).unwrap()
}

#[test]
fn test_rekeying_merge_two_endpoints() {
    let mut responses = ResponseMap::new();
    responses.insert(
        fingerprint("a", "uuid-a"),
        serde_json::to_vec(&json!({"data": [1, 2]})).unwrap(),
    );
    responses.insert(
        fingerprint("b", "uuid-b"),
        serde_json::to_vec(&json!({"data": [3]})).unwrap(),
    );
    let keys = vec![
        record("a", "uuid-a", &[("data", "groupA.items")], &[]),
        record("b", "uuid-b", &[("data", "groupB.items")], &[]),
    ];

    let output = default_json_post_process(&responses, &keys).unwrap();
    assert_eq!(
        parse(&output),
        json!({"groupA": {"items": [1, 2]}, "groupB": {"items": [3]}})
    );
}

#[test]
fn test_top_level_list_wrapped_as_items() {
    let mut responses = ResponseMap::new();
    responses.insert(
        fingerprint("listing", "uuid-1"),
        serde_json::to_vec(&json!([{"id": 1}, {"id": 2}])).unwrap(),
    );
    let keys = vec![record("listing", "uuid-1", &[("", "everything")], &[])];

    let output = default_json_post_process(&responses, &keys).unwrap();
    assert_eq!(parse(&output), json!({"everything": [{"id": 1}, {"id": 2}]}));
}

#[test]
fn test_list_wrapping_preserves_existing_base_key() {
    let mut responses = ResponseMap::new();
    responses.insert(
        fingerprint("listing", "uuid-1"),
        serde_json::to_vec(&json!([{"inner": {"id": 7}}])).unwrap(),
    );
    let keys = vec![record("listing", "uuid-1", &[("inner", "results")], &[])];

    let output = default_json_post_process(&responses, &keys).unwrap();
    assert_eq!(parse(&output), json!({"results": [{"id": 7}]}));
}

#[test]
fn test_endpoint_key_values_overlaid_on_objects() {
    let mut fp = fingerprint("stats", "uuid-1");
    fp.endpoint_key_values = serde_json::to_string(&json!({"project_id": "42"})).unwrap();

    let mut responses = ResponseMap::new();
    responses.insert(
        fp,
        serde_json::to_vec(&json!({"stats": [{"commits": 10}, 5]})).unwrap(),
    );
    let keys = vec![record("stats", "uuid-1", &[("stats", "statistics")], &[])];

    let output = default_json_post_process(&responses, &keys).unwrap();
    // Objects gain the parent attribute, scalars pass through untouched.
    assert_eq!(
        parse(&output),
        json!({"statistics": [{"commits": 10, "project_id": "42"}, 5]})
    );
}

#[test]
fn test_error_branch_collapses_second_writer_wins() {
    let mut responses = ResponseMap::new();
    responses.insert(
        fingerprint("users", "uuid-1"),
        serde_json::to_vec(&json!({
            "data": [1],
            "error": [{"message": "partial failure"}]
        }))
        .unwrap(),
    );
    let keys = vec![record(
        "users",
        "uuid-1",
        &[("data", "shared")],
        &[("error", "shared")],
    )];

    let output = default_json_post_process(&responses, &keys).unwrap();
    assert_eq!(
        parse(&output),
        json!({"shared": [{"message": "partial failure"}]})
    );

    let output = default_json_post_process_with_policy(&responses, &keys, MergePolicy::PreserveSuccess)
        .unwrap();
    assert_eq!(parse(&output), json!({"shared": [1]}));
}

#[test]
fn test_error_branch_skipped_when_root_absent() {
    let mut responses = ResponseMap::new();
    responses.insert(
        fingerprint("users", "uuid-1"),
        serde_json::to_vec(&json!({"data": [1]})).unwrap(),
    );
    let keys = vec![record(
        "users",
        "uuid-1",
        &[("data", "users")],
        &[("error", "errors")],
    )];

    let output = default_json_post_process(&responses, &keys).unwrap();
    assert_eq!(parse(&output), json!({"users": [1]}));
}

// Pages accumulate by raw byte concatenation; every complete document in
// the stream must contribute its fragment.
#[test]
fn test_concatenated_pages_all_contribute() {
    let mut payload = serde_json::to_vec(&json!({"data": [1, 2]})).unwrap();
    payload.extend(serde_json::to_vec(&json!({"data": [3, 4]})).unwrap());

    let mut responses = ResponseMap::new();
    responses.insert(fingerprint("paged", "uuid-1"), payload);
    let keys = vec![record("paged", "uuid-1", &[("data", "merged")], &[])];

    let output = default_json_post_process(&responses, &keys).unwrap();
    assert_eq!(parse(&output), json!({"merged": [1, 2, 3, 4]}));
}

#[test]
fn test_multiple_key_pairs_per_call() {
    let mut responses = ResponseMap::new();
    responses.insert(
        fingerprint("dual", "uuid-1"),
        serde_json::to_vec(&json!({"users": [1], "groups": [2]})).unwrap(),
    );
    let keys = vec![record(
        "dual",
        "uuid-1",
        &[("users", "out.users"), ("groups", "out.groups")],
        &[],
    )];

    let output = default_json_post_process(&responses, &keys).unwrap();
    assert_eq!(
        parse(&output),
        json!({"out": {"users": [1], "groups": [2]}})
    );
}

#[test]
fn test_unparseable_payload_is_skipped() {
    let mut responses = ResponseMap::new();
    responses.insert(fingerprint("broken", "uuid-1"), b"<html>nope</html>".to_vec());
    responses.insert(
        fingerprint("fine", "uuid-2"),
        serde_json::to_vec(&json!({"data": [1]})).unwrap(),
    );
    let keys = vec![
        record("broken", "uuid-1", &[("data", "broken")], &[]),
        record("fine", "uuid-2", &[("data", "fine")], &[]),
    ];

    let output = default_json_post_process(&responses, &keys).unwrap();
    assert_eq!(parse(&output), json!({"fine": [1]}));
}

#[test]
fn test_collapse_json_empty_structures() {
    let output = collapse_json(&json!({}), &json!({}), MergePolicy::default()).unwrap();
    assert_eq!(parse(&output), json!({}));
}
