//! Adapter module
//!
//! The pluggable backend seam. An adapter supplies the four callables the
//! engine needs: request authentication, response normalization to JSON,
//! the paging peek, and the final post-processing merge. Backends are
//! resolved by the `plugin` identifier of a descriptor through the
//! [`AdapterRegistry`].

mod builtin;
mod peek;
mod registry;
mod xml;

pub use builtin::{BuiltinAdapter, Normalizer, PeekKind};
pub use peek::{calculated_json_peek, default_json_peek, regex_json_peek};
pub use registry::AdapterRegistry;
pub use xml::{remove_xml_tag, xml_to_json};

use crate::error::Result;
use crate::request::{EffectiveRequest, ResponseMap};
use crate::types::{JsonValue, KeyRecord, StringMap};
use async_trait::async_trait;

/// Backend capability record.
///
/// One adapter instance is bound per descriptor; the post-process hook is
/// bound once per run from the first descriptor whose adapter provides
/// one, which enforces a single cross-descriptor merge policy.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Decorate a request with credentials (headers, querystring
    /// parameters, a bearer token, or a configured HTTP client).
    async fn authenticate(
        &self,
        request: EffectiveRequest,
        auth_params: &[String],
    ) -> Result<EffectiveRequest>;

    /// Normalize a raw response into JSON bytes before sub-endpoint key
    /// extraction.
    fn response_to_json(&self, vars: &StringMap, raw: &[u8]) -> Result<Vec<u8>>;

    /// Inspect a response and decide whether and how to page.
    fn paging_peek(
        &self,
        payload: &[u8],
        response_keys: &[String],
        old_page_value: Option<&JsonValue>,
        peek_params: &[String],
    ) -> Result<(Option<JsonValue>, bool)>;

    /// Fold the accumulated response map into the final document.
    fn post_process(
        &self,
        responses: &ResponseMap,
        json_keys: &[KeyRecord],
        post_params: &[String],
    ) -> Result<Vec<u8>>;

    /// Whether this adapter supplies a post-process hook at all.
    fn provides_post_process(&self) -> bool {
        true
    }
}
