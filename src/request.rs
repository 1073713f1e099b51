//! Effective request types
//!
//! An [`EffectiveRequest`] is a descriptor endpoint instantiated with all
//! substitutions applied and all merged settings frozen. Its
//! [`Fingerprint`] is the identity under which accumulated page bodies are
//! stored for the whole run.

use crate::loader::ParamBags;
use crate::types::{JsonValue, StringMap};
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use std::collections::{BTreeMap, HashMap};
use url::Url;

// ============================================================================
// Inheritable Settings
// ============================================================================

/// Settings snapshot frozen into an effective request
#[derive(Debug, Clone, Default)]
pub struct InheritableSettings {
    /// Substituted endpoint name
    pub name: String,
    /// Merged substitution vars
    pub vars: StringMap,
    /// Selected paging configuration
    pub paging: StringMap,
    /// Disables the default JSON content type
    pub skip_content_type: bool,
}

// ============================================================================
// Effective Request
// ============================================================================

/// A realized request, alive for one pagination loop
#[derive(Debug, Clone)]
pub struct EffectiveRequest {
    /// Frozen settings snapshot
    pub settings: InheritableSettings,
    /// Substituted URL template the request was built from
    pub endpoint: String,
    /// Source dotted paths into the response
    pub current_base_key: Vec<String>,
    /// Target dotted paths in the merged document
    pub desired_base_key: Vec<String>,
    /// Source dotted paths for error branches
    pub current_error_key: Vec<String>,
    /// Target dotted paths for error branches
    pub desired_error_key: Vec<String>,
    /// Parent-derived attributes carried through fan-out
    pub endpoint_key_values: HashMap<String, JsonValue>,
    /// Parameter bags the request was assembled from
    pub params: ParamBags,
    /// Fully assembled request URL including the encoded query string
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Client installed by adapters that manage their own HTTP lifecycle;
    /// ownership lives and dies with this request
    pub client: Option<reqwest::Client>,
    /// First attempt timestamp
    pub attempt_time: DateTime<Utc>,
    /// Instantiation timestamp, frozen across pages
    pub time: DateTime<Utc>,
}

impl EffectiveRequest {
    /// Derive the accumulation identity for this request.
    ///
    /// The UUID is filled in by the traversal engine; the response code
    /// defaults to 200 and only changes under connection-check runs.
    pub fn to_fingerprint(&self) -> Fingerprint {
        Fingerprint {
            name: self.settings.name.clone(),
            uuid: String::new(),
            endpoint: self.endpoint.clone(),
            endpoint_key_values: serialize_key_values(&self.endpoint_key_values),
            attempt_time: self.attempt_time,
            time: self.time,
            response_code: 200,
        }
    }

    /// Replace (or add) a query parameter on the request URL.
    pub fn set_query_param(&mut self, key: &str, value: &str) {
        let retained: Vec<(String, String)> = self
            .url
            .query_pairs()
            .filter(|(k, _)| k != key)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        self.url.query_pairs_mut().clear();
        {
            let mut pairs = self.url.query_pairs_mut();
            for (k, v) in &retained {
                pairs.append_pair(k, v);
            }
            pairs.append_pair(key, value);
        }
        if self.url.query() == Some("") {
            self.url.set_query(None);
        }
    }
}

/// Serialize endpoint key values deterministically.
///
/// Keys are sorted so two requests carrying the same attribute set always
/// produce the same fingerprint component.
fn serialize_key_values(values: &HashMap<String, JsonValue>) -> String {
    if values.is_empty() {
        return String::new();
    }
    let ordered: BTreeMap<&String, &JsonValue> = values.iter().collect();
    serde_json::to_string(&ordered).unwrap_or_default()
}

// ============================================================================
// Fingerprint
// ============================================================================

/// Identity of one endpoint instantiation in the response map.
///
/// A UUID is minted per instantiation so that paged responses for one call
/// collapse under a single key while fan-out siblings stay distinct. Only
/// the response code participates in connection-check discrimination;
/// otherwise it is fixed at 200.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    /// Substituted endpoint name
    pub name: String,
    /// Per-instantiation UUID
    pub uuid: String,
    /// Substituted URL template
    pub endpoint: String,
    /// Serialized parent-derived attributes
    pub endpoint_key_values: String,
    /// First attempt timestamp
    pub attempt_time: DateTime<Utc>,
    /// Instantiation timestamp
    pub time: DateTime<Utc>,
    /// HTTP response code (200 except under connection checks)
    pub response_code: u16,
}

/// Accumulated page bodies keyed by request fingerprint, append-only
/// within one run
pub type ResponseMap = HashMap<Fingerprint, Vec<u8>>;
