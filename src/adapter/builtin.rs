//! Built-in adapters
//!
//! A [`BuiltinAdapter`] composes a response normalizer with a peek flavor
//! and dispatches authentication by a scheme tag carried as the first auth
//! parameter. Backends with bespoke behavior implement [`Adapter`]
//! directly and register themselves alongside these.

use super::peek::{calculated_json_peek, default_json_peek, regex_json_peek};
use super::xml::{remove_xml_tag, xml_to_json};
use super::Adapter;
use crate::auth;
use crate::error::{Error, Result};
use crate::postprocess;
use crate::request::{EffectiveRequest, ResponseMap};
use crate::types::{JsonValue, KeyRecord, StringMap};
use async_trait::async_trait;

/// Response normalization flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    /// Responses are already JSON and pass through unchanged
    Json,
    /// Responses are XML and convert to JSON, with optional wrapper tag
    /// scrubbing driven by the endpoint's `strip_xml_tags` var
    Xml,
}

/// Peek flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeekKind {
    /// Plain drill-down peek with fixed-point detection
    Default,
    /// Regex capture over the drilled value
    Regex,
    /// Page-number arithmetic over page/per-page/total paths
    Calculated,
}

/// Adapter composed from built-in parts
#[derive(Debug, Clone)]
pub struct BuiltinAdapter {
    normalizer: Normalizer,
    peek: PeekKind,
}

impl BuiltinAdapter {
    /// Compose an adapter from a normalizer and a peek flavor.
    pub fn new(normalizer: Normalizer, peek: PeekKind) -> Self {
        Self { normalizer, peek }
    }
}

#[async_trait]
impl Adapter for BuiltinAdapter {
    /// Dispatch on the scheme tag in `auth_params[0]`; the remaining
    /// parameters feed the selected credential flow.
    async fn authenticate(
        &self,
        request: EffectiveRequest,
        auth_params: &[String],
    ) -> Result<EffectiveRequest> {
        let Some((scheme, rest)) = auth_params.split_first() else {
            return Ok(request);
        };
        match scheme.as_str() {
            "none" | "" => Ok(request),
            "basic" => auth::basic_auth(request, rest),
            "header" => auth::custom_header_auth(request, rest),
            "querystring" => auth::custom_querystring_auth(request, rest),
            "header+basic" => auth::custom_header_and_basic_auth(request, rest),
            "session" => auth::session_token_auth(request, rest).await,
            "oauth2" => auth::oauth2_client_credentials_auth(request, rest).await,
            "jwt" => auth::jwt_auth(request, rest).await,
            "onelogin" => auth::onelogin_auth(request, rest).await,
            other => Err(Error::auth(format!("Unknown auth scheme '{other}'"))),
        }
    }

    fn response_to_json(&self, vars: &StringMap, raw: &[u8]) -> Result<Vec<u8>> {
        match self.normalizer {
            Normalizer::Json => Ok(raw.to_vec()),
            Normalizer::Xml => {
                let text = std::str::from_utf8(raw).map_err(|e| Error::XmlParse {
                    message: format!("Response is not valid UTF-8: {e}"),
                })?;
                let mut converted = xml_to_json(text)?;
                if let Some(tags) = vars.get("strip_xml_tags") {
                    for tag in tags.split(',').filter(|t| !t.is_empty()) {
                        converted = remove_xml_tag(tag, converted);
                    }
                }
                Ok(serde_json::to_vec(&converted)?)
            }
        }
    }

    fn paging_peek(
        &self,
        payload: &[u8],
        response_keys: &[String],
        old_page_value: Option<&JsonValue>,
        peek_params: &[String],
    ) -> Result<(Option<JsonValue>, bool)> {
        match self.peek {
            PeekKind::Default => {
                default_json_peek(payload, response_keys, old_page_value, peek_params)
            }
            PeekKind::Regex => regex_json_peek(payload, response_keys, old_page_value, peek_params),
            PeekKind::Calculated => {
                calculated_json_peek(payload, response_keys, old_page_value, peek_params)
            }
        }
    }

    fn post_process(
        &self,
        responses: &ResponseMap,
        json_keys: &[KeyRecord],
        _post_params: &[String],
    ) -> Result<Vec<u8>> {
        postprocess::default_json_post_process(responses, json_keys)
    }
}
