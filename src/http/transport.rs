//! Request execution
//!
//! One function runs one realized request and hands back status, body, and
//! headers. The engine owns sequencing; no retries, timeouts, or pooling
//! happen here. A transport-level failure synthesizes a 400 response with
//! `[]` standing in for both body and headers so the accumulator always
//! receives bytes.

use crate::request::EffectiveRequest;
use reqwest::header::CONTENT_TYPE;
use std::collections::BTreeMap;
use tracing::{error, info};

/// Outcome of one request execution
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code (400 when the transport itself failed)
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
    /// Response headers serialized as a JSON object of value lists
    pub headers: Vec<u8>,
}

const SYNTHETIC_EMPTY: &[u8] = b"[]";

fn log_enabled(var: &str) -> bool {
    std::env::var(var).is_ok_and(|v| v == "true")
}

/// Execute a realized request.
pub async fn run_request(request: &EffectiveRequest) -> HttpResponse {
    if log_enabled("EPICO_LOG_REQUEST") {
        info!("Request: GET {}", request.url);
    }
    if log_enabled("EPICO_LOG_REQUEST_HEADERS") {
        info!("Request Headers: {:?}", request.headers);
    }
    if log_enabled("EPICO_LOG_REQUEST_BODY") {
        info!("Request Body: {:?}", request.params.body);
    }

    let client = request.client.clone().unwrap_or_default();
    let mut builder = client
        .get(request.url.clone())
        .headers(request.headers.clone());
    if !request.settings.skip_content_type && !request.headers.contains_key(CONTENT_TYPE) {
        builder = builder.header(CONTENT_TYPE, "application/json");
    }

    let response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            error!("Error running the request: {e}");
            return HttpResponse {
                status: 400,
                body: SYNTHETIC_EMPTY.to_vec(),
                headers: SYNTHETIC_EMPTY.to_vec(),
            };
        }
    };

    let status = response.status().as_u16();
    let headers = serialize_headers(response.headers());
    if log_enabled("EPICO_LOG_RESPONSE_HEADERS") {
        info!("Response Headers: {:?}", response.headers());
    }

    let body = match response.bytes().await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            error!("Error reading response body: {e}");
            return HttpResponse {
                status,
                body: SYNTHETIC_EMPTY.to_vec(),
                headers: SYNTHETIC_EMPTY.to_vec(),
            };
        }
    };
    let body = if status == 204 && body.is_empty() {
        SYNTHETIC_EMPTY.to_vec()
    } else {
        body
    };

    if log_enabled("EPICO_LOG_RESPONSE") {
        info!("Response: {}", String::from_utf8_lossy(&body));
    }

    HttpResponse {
        status,
        body,
        headers,
    }
}

/// Serialize response headers into the JSON object shape the peek
/// protocol reads (`header name -> list of values`).
fn serialize_headers(headers: &reqwest::header::HeaderMap) -> Vec<u8> {
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in headers {
        map.entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    serde_json::to_vec(&map).unwrap_or_else(|_| SYNTHETIC_EMPTY.to_vec())
}
