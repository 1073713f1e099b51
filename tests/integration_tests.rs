//! Integration tests using a mock HTTP server
//!
//! Exercise the full end-to-end flow: descriptor YAML → authenticated
//! requests → pagination → fan-out → merged JSON document.

use harvester::{HarvestOptions, Harvester};
use serde_json::{json, Value};
use std::path::Path;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_descriptor(dir: &Path, name: &str, yaml: &str, base_url: &str) {
    std::fs::write(dir.join(name), yaml.replace("BASE_URL", base_url)).unwrap();
}

async fn harvest(options: HarvestOptions) -> Value {
    let output = Harvester::new().harvest(&options).await.unwrap();
    serde_json::from_slice(&output).unwrap()
}

// ============================================================================
// Full scan: auth splice + pagination + fan-out + error branch
// ============================================================================

#[tokio::test]
async fn test_full_scan_flow() {
    let server = MockServer::start().await;

    // Projects come in two pages, authenticated by a spliced header token.
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(header("PRIVATE-TOKEN", "secret-token"))
        .and(query_param("cursor", "C2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": [{"id": 2, "name": "beta"}],
            "cursor": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/projects"))
        .and(header("PRIVATE-TOKEN", "secret-token"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": [{"id": 1, "name": "alpha"}],
            "cursor": "C2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Per-project statistics fan out from the first page's ids.
    Mock::given(method("GET"))
        .and(path("/api/projects/1/languages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "languages": [{"name": "Rust", "share": 88.5}],
            "error": [{"message": "partial"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let descriptor = r#"
name: gitlab
plugin: json
paging:
  location_from: body
  indicator_from_field: cursor
  location_to: querystring
  indicator_to_field: cursor
auth_params:
  - header
  - PRIVATE-TOKEN
  - "{{}}"
endpoints:
  - name: list_projects
    endpoint: BASE_URL/api/projects
    current_base_key: [projects]
    desired_base_key: [projects]
    endpoints:
      projects.id:
        - name: project_languages
          endpoint: BASE_URL/api/projects/{{endpoint_key}}/languages
          endpoint_key_names:
            "{{endpoint_key}}": project_id
          current_base_key: [languages]
          desired_base_key: [languages]
          current_error_key: [error]
          desired_error_key: [language_errors]
"#;

    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "gitlab.yaml", descriptor, &server.uri());

    let output = harvest(
        HarvestOptions::new(dir.path())
            .with_auth_params(vec!["secret-token".to_string()]),
    )
    .await;

    // Both pages of projects landed under one key.
    let mut ids: Vec<i64> = output["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2]);

    // The fan-out child carries the parent-derived id and its error branch
    // landed under its own key.
    let lang = &output["languages"][0];
    assert_eq!(lang["name"], "Rust");
    assert_eq!(lang["project_id"], "1");
    assert_eq!(output["language_errors"], json!([{"message": "partial"}]));
}

// ============================================================================
// Multiple descriptors merge into one document
// ============================================================================

#[tokio::test]
async fn test_two_descriptors_one_document() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": ["alice", "bob"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": ["admins"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let users = r"
name: users
plugin: json
endpoints:
  - name: list_users
    endpoint: BASE_URL/users
    current_base_key: [data]
    desired_base_key: [directory.users]
";
    let groups = r"
name: groups
plugin: json
endpoints:
  - name: list_groups
    endpoint: BASE_URL/groups
    current_base_key: [data]
    desired_base_key: [directory.groups]
";

    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "a-users.yaml", users, &server.uri());
    write_descriptor(dir.path(), "b-groups.yaml", groups, &server.uri());

    let output = harvest(HarvestOptions::new(dir.path())).await;
    assert_eq!(
        output,
        json!({
            "directory": {
                "users": ["alice", "bob"],
                "groups": ["admins"]
            }
        })
    );
}

// ============================================================================
// XML adapter end to end
// ============================================================================

#[tokio::test]
async fn test_xml_descriptor_flow() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/inventory"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(
                "<result><hosts><host><name>web-1</name></host><host><name>web-2</name></host></hosts></result>",
            ),
        )
        .expect(1)
        .mount(&server)
        .await;
    for host in ["web-1", "web-2"] {
        Mock::given(method("GET"))
            .and(path(format!("/hosts/{host}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "facts": [{"os": "linux"}]
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    // The parent response is XML; sub-endpoint extraction sees it as JSON.
    let descriptor = r#"
name: inventory
plugin: xml
endpoints:
  - name: list_inventory
    endpoint: BASE_URL/inventory
    vars:
      strip_xml_tags: host
    current_base_key: [hosts]
    desired_base_key: [raw_inventory]
    endpoints:
      hosts.name:
        - name: host_facts
          endpoint: BASE_URL/hosts/{{endpoint_key}}
          endpoint_key_names:
            "{{endpoint_key}}": host_name
          current_base_key: [facts]
          desired_base_key: [facts]
"#;

    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "inventory.yaml", descriptor, &server.uri());

    let output = harvest(HarvestOptions::new(dir.path())).await;

    let mut hosts: Vec<String> = output["facts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["host_name"].as_str().unwrap().to_string())
        .collect();
    hosts.sort();
    assert_eq!(hosts, vec!["web-1", "web-2"]);
}

// ============================================================================
// Connection check across descriptors
// ============================================================================

#[tokio::test]
async fn test_connection_check_two_descriptors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    // The first descriptor has no connection-check endpoint at all.
    let scan_only = r"
name: scan-only
plugin: json
endpoints:
  - name: heavy_listing
    endpoint: BASE_URL/heavy
    current_base_key: [data]
    desired_base_key: [data]
";
    let check = r"
name: check
plugin: json
endpoints:
  - name: ping
    endpoint: BASE_URL/ping
    use_for_connection_check: true
    current_base_key: [status]
    desired_base_key: [connection]
";

    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "a-scan.yaml", scan_only, &server.uri());
    write_descriptor(dir.path(), "b-check.yaml", check, &server.uri());

    let output = harvest(HarvestOptions::new(dir.path()).connection_only(true)).await;
    assert_eq!(output, json!({"connection": ["ok"]}));
}

// ============================================================================
// Time tokens reach the wire
// ============================================================================

#[tokio::test]
async fn test_time_token_in_querystring() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [1]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let descriptor = r#"
name: events
plugin: json
endpoints:
  - name: list_events
    endpoint: BASE_URL/events
    current_base_key: [events]
    desired_base_key: [events]
    params:
      querystring:
        since: ["{{time:-1h}}"]
"#;

    let dir = tempfile::tempdir().unwrap();
    write_descriptor(dir.path(), "events.yaml", descriptor, &server.uri());

    let before = chrono::Utc::now().timestamp();
    let output = harvest(HarvestOptions::new(dir.path())).await;
    assert_eq!(output, json!({"events": [1]}));

    let requests = server.received_requests().await.unwrap();
    let since: i64 = requests[0]
        .url
        .query_pairs()
        .find(|(k, _)| k == "since")
        .map(|(_, v)| v.parse().unwrap())
        .unwrap();
    // Within a couple of seconds of one hour ago.
    assert!((since - (before - 3600)).abs() <= 2);
}
