//! Endpoint traversal engine
//!
//! The harvesting core: loads each descriptor, expands its variable
//! matrix, binds its adapter, and walks every endpoint through template
//! substitution, the request/pagination loop, and sub-endpoint fan-out,
//! accumulating page bodies by fingerprint. One post-process pass over the
//! whole accumulation produces the final document.
//!
//! Processing is strictly sequential; the only suspension points are the
//! outbound HTTP awaits.

mod types;

pub use types::{HarvestOptions, RootSettings};

use crate::adapter::{Adapter, AdapterRegistry};
use crate::error::{Error, Result};
use crate::http::{run_request, HttpResponse};
use crate::jsonpath::{extract, split_path};
use crate::loader::{
    expand_vars_data, list_descriptor_files, load_descriptor_from_str, EndpointDescriptor,
    ParamBags,
};
use crate::reporter::{Reporter, ScanLog};
use crate::request::{EffectiveRequest, Fingerprint, InheritableSettings, ResponseMap};
use crate::template;
use crate::types::{format_float_plain, humanize, JsonValue, KeyRecord, StringMap};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

type BoxedEndpointRun<'a> =
    Pin<Box<dyn Future<Output = Result<(ResponseMap, Vec<KeyRecord>)>> + Send + 'a>>;

/// The harvesting engine
pub struct Harvester {
    registry: AdapterRegistry,
    reporter_base_url: Option<String>,
}

impl Harvester {
    /// Create a harvester with the built-in adapters.
    pub fn new() -> Self {
        Self {
            registry: AdapterRegistry::with_builtins(),
            reporter_base_url: None,
        }
    }

    /// Create a harvester with a custom adapter registry.
    pub fn with_registry(registry: AdapterRegistry) -> Self {
        Self {
            registry,
            reporter_base_url: None,
        }
    }

    /// Override the dashboard base URL (otherwise `DASHBOARD_API_URL`).
    #[must_use]
    pub fn with_reporter_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.reporter_base_url = Some(base_url.into());
        self
    }

    /// Run a full harvest and return the merged JSON document.
    ///
    /// Each descriptor file is processed independently: a broken
    /// descriptor is logged and dropped without stopping the next one.
    /// When nothing accumulates, or no connection-check endpoint
    /// succeeds, the short `{"Errors": …}` envelope is returned instead.
    pub async fn harvest(&self, options: &HarvestOptions) -> Result<Vec<u8>> {
        let files = list_descriptor_files(&options.config_dir)?;

        let mut reporter = Reporter::new(&options.api_key, &options.api_secret);
        if let Some(base_url) = &self.reporter_base_url {
            reporter = reporter.with_base_url(base_url.clone());
        }
        if !options.connection_only {
            self.report(&reporter, options, vec![ScanLog::text("Accessing APIs:")])
                .await;
        }

        let mut responses = ResponseMap::new();
        let mut json_keys: Vec<KeyRecord> = Vec::new();
        // Post-processing applies across every descriptor, so only the
        // first adapter that offers one gets to define it.
        let mut post_processor: Option<Arc<dyn Adapter>> = None;

        for file in files {
            let outcome = self
                .process_descriptor(
                    &file,
                    options,
                    &reporter,
                    &mut responses,
                    &mut json_keys,
                    &mut post_processor,
                )
                .await;
            if let Err(e) = outcome {
                error!("Descriptor '{}' failed: {e}", file.display());
            }
        }

        let error_envelope = serde_json::to_vec(&json!({"Errors": "Invalid Credentials"}))?;
        if responses.is_empty() {
            return Ok(error_envelope);
        }

        if options.connection_only {
            match discriminate_connection_check(&responses)? {
                CheckOutcome::Envelope(envelope) => return Ok(envelope),
                CheckOutcome::Proceed(selected) => responses = selected,
            }
        }

        let Some(post_processor) = post_processor else {
            return Ok(error_envelope);
        };
        post_processor.post_process(&responses, &json_keys, &options.post_params)
    }

    /// Process one descriptor file: expand, bind, traverse.
    async fn process_descriptor(
        &self,
        file: &std::path::Path,
        options: &HarvestOptions,
        reporter: &Reporter,
        responses: &mut ResponseMap,
        json_keys: &mut Vec<KeyRecord>,
        post_processor: &mut Option<Arc<dyn Adapter>>,
    ) -> Result<()> {
        let raw = std::fs::read_to_string(file)?;
        let root = load_descriptor_from_str(&raw)?;

        let expanded = expand_vars_data(&raw, &root.vars_data);
        for document in expanded {
            // Reparse so expansion vars in any field take effect.
            let api = load_descriptor_from_str(&document)?;

            let auth_params =
                splice_placeholder_params(&api.auth_params, &options.auth_params, true);
            let paging_params =
                splice_placeholder_params(&api.paging_params, &options.peek_params, false);

            let adapter = self.registry.resolve(&api.plugin)?;
            if post_processor.is_none() && adapter.provides_post_process() {
                *post_processor = Some(adapter.clone());
            }

            let root_settings = RootSettings {
                name: api.name.clone(),
                vars: api.vars.clone(),
                paging: api.paging.clone(),
                auth_params,
                paging_params,
                global_vars: api.global_vars.clone(),
                skip_content_type: api.skip_content_type,
            };

            let (descriptor_responses, descriptor_keys) = self
                .run_endpoints(
                    &api.endpoints,
                    &root_settings,
                    adapter.as_ref(),
                    options,
                    reporter,
                    true,
                )
                .await?;
            responses.extend(descriptor_responses);
            json_keys.extend(descriptor_keys);
        }
        Ok(())
    }

    /// Walk one endpoint sequence: substitute, request, page, fan out.
    ///
    /// `run_sub_endpoints` is true only at the top level; fan-out children
    /// run with it false, giving a single level of fan-out per parent.
    async fn run_endpoints(
        &self,
        endpoints: &[EndpointDescriptor],
        root: &RootSettings,
        adapter: &dyn Adapter,
        options: &HarvestOptions,
        reporter: &Reporter,
        run_sub_endpoints: bool,
    ) -> Result<(ResponseMap, Vec<KeyRecord>)> {
        let mut responses = ResponseMap::new();
        let mut json_keys: Vec<KeyRecord> = Vec::new();

        for endpoint in endpoints {
            let mut ep = endpoint.clone();

            if options.connection_only {
                if !ep.use_for_connection_check {
                    continue;
                }
            } else if ep.skip_for_scans {
                debug!("Endpoint marked to skip: {}", ep.name);
                continue;
            }

            let (vars, do_substitutions) =
                template::merge_vars(&root.vars, &ep.vars, &root.global_vars);
            if vars.iter().any(|(k, v)| {
                ep.skip_endpoint
                    .get(k)
                    .is_some_and(|skipped| skipped.contains(v))
            }) {
                continue;
            }

            let mut name = if ep.name.is_empty() {
                root.name.clone()
            } else {
                ep.name.clone()
            };
            let paging = if ep.paging.is_empty() {
                root.paging.clone()
            } else {
                ep.paging.clone()
            };
            let mut current_base_key = ep.current_base_key.clone();
            let mut desired_base_key = ep.desired_base_key.clone();
            let mut current_error_key = ep.current_error_key.clone();
            let mut desired_error_key = ep.desired_error_key.clone();
            let mut params = if ep.params.is_empty() {
                ParamBags::default()
            } else {
                ep.params.clone()
            };

            template::expand_time_tokens(&mut params.querystring)?;

            // Runtime params append; body is reserved.
            if let Some(sections) = options.runtime_params.get(&ep.name) {
                if let Some(headers) = sections.get("header") {
                    for (k, v) in headers {
                        params.header.entry(k.clone()).or_default().push(v.clone());
                    }
                }
                if let Some(query) = sections.get("querystring") {
                    for (k, v) in query {
                        params
                            .querystring
                            .entry(k.clone())
                            .or_default()
                            .push(v.clone());
                    }
                }
            }

            if current_base_key.len() != desired_base_key.len()
                || current_error_key.len() != desired_error_key.len()
            {
                return Err(Error::KeyListMismatch {
                    endpoint: ep.name.clone(),
                });
            }

            if do_substitutions {
                for (key, value) in &vars {
                    name = template::replace_var(&name, key, value);
                    for list in [
                        &mut current_base_key,
                        &mut desired_base_key,
                        &mut current_error_key,
                        &mut desired_error_key,
                    ] {
                        for item in list.iter_mut() {
                            *item = template::replace_var(item, key, value);
                        }
                    }
                    for bag in [&mut params.header, &mut params.querystring, &mut params.body] {
                        for values in bag.values_mut() {
                            for item in values.iter_mut() {
                                *item = template::replace_var(item, key, value);
                            }
                        }
                    }
                    ep.endpoint = template::replace_var(&ep.endpoint, key, value);
                    ep.endpoint =
                        template::apply_var_params(&ep.endpoint, key, &options.runtime_params);
                    ep.documentation = template::replace_var(&ep.documentation, key, value);
                }
            }

            let url = Url::parse(&ep.endpoint)?;
            let uuid = Uuid::new_v4().to_string();

            let mut key_record = KeyRecord::new();
            key_record.insert("api_call_name".to_string(), ep.name.clone());
            key_record.insert("api_call_uuid".to_string(), uuid.clone());
            for (k, v) in &ep.vars {
                key_record.insert(k.clone(), v.clone());
            }
            // Multiple base/error keys break request comparability, so
            // they ride in the key record instead of the fingerprint.
            key_record.insert("key_count".to_string(), current_base_key.len().to_string());
            for (i, (current, desired)) in current_base_key
                .iter()
                .zip(desired_base_key.iter())
                .enumerate()
            {
                key_record.insert(format!("current_base_key_{i}"), current.clone());
                key_record.insert(format!("desired_base_key_{i}"), desired.clone());
            }
            for (i, (current, desired)) in current_error_key
                .iter()
                .zip(desired_error_key.iter())
                .enumerate()
            {
                key_record.insert(format!("current_error_key_{i}"), current.clone());
                key_record.insert(format!("desired_error_key_{i}"), desired.clone());
            }
            if !json_keys.contains(&key_record) {
                json_keys.push(key_record);
            }

            let now = Utc::now();
            let mut request = EffectiveRequest {
                settings: InheritableSettings {
                    name,
                    vars: vars.clone(),
                    paging: paging.clone(),
                    skip_content_type: root.skip_content_type,
                },
                endpoint: ep.endpoint.clone(),
                current_base_key,
                desired_base_key,
                current_error_key,
                desired_error_key,
                endpoint_key_values: ep.endpoint_key_values.clone(),
                params,
                url,
                headers: HeaderMap::new(),
                client: None,
                attempt_time: now,
                time: now,
            };
            apply_param_bags(&mut request);

            if !options.connection_only {
                self.report(
                    reporter,
                    options,
                    vec![ScanLog::info(format!("- {}", humanize(&ep.name)))],
                )
                .await;
            }

            let authed = match adapter
                .authenticate(request.clone(), &root.auth_params)
                .await
            {
                Ok(authed) => authed,
                Err(e) => {
                    warn!("[{}] Authentication failed: {e}", ep.name);
                    continue;
                }
            };
            let HttpResponse {
                status,
                body,
                headers,
            } = run_request(&authed).await;
            if !(200..=299).contains(&status) {
                warn!("[{}] Expected response status 2xx, got {status}", ep.name);
                if !options.connection_only {
                    continue;
                }
            }

            let mut fingerprint = request.to_fingerprint();
            fingerprint.uuid = uuid.clone();
            if options.connection_only {
                fingerprint.response_code = status;
            }
            if ep.keep_response() {
                responses
                    .entry(fingerprint.clone())
                    .or_default()
                    .extend_from_slice(&body);
            }

            // The fingerprint is frozen here so every later page of this
            // instance accumulates under the same key.
            self.run_paging_loop(
                adapter,
                root,
                &ep,
                &mut request,
                &fingerprint,
                &body,
                &headers,
                &mut responses,
            )
            .await?;

            if run_sub_endpoints && !ep.endpoints.is_empty() {
                let (sub_responses, sub_keys) = self
                    .fan_out(adapter, root, options, reporter, &ep, &body)
                    .await?;
                responses.extend(sub_responses);
                json_keys.extend(sub_keys);
            }
        }

        Ok((responses, json_keys))
    }

    /// Follow pagination to exhaustion, accumulating under one
    /// fingerprint.
    #[allow(clippy::too_many_arguments)]
    async fn run_paging_loop(
        &self,
        adapter: &dyn Adapter,
        root: &RootSettings,
        ep: &EndpointDescriptor,
        request: &mut EffectiveRequest,
        fingerprint: &Fingerprint,
        first_body: &[u8],
        first_headers: &[u8],
        responses: &mut ResponseMap,
    ) -> Result<()> {
        let response_keys = build_response_keys(&request.settings.paging)?;
        let peek_from_headers =
            request.settings.paging.get("location_from").map(String::as_str) == Some("header");

        let payload = if peek_from_headers {
            first_headers
        } else {
            first_body
        };
        let (mut page_value, mut more_pages) =
            match adapter.paging_peek(payload, &response_keys, None, &root.paging_params) {
                Ok(peeked) => peeked,
                Err(e) => {
                    warn!("[{}] Paging peek failed: {e}", ep.name);
                    (None, false)
                }
            };

        while more_pages {
            let old_page_value = page_value.clone();
            let Some(indicator) = old_page_value.clone() else {
                break;
            };

            match request.settings.paging.get("location_to").map(String::as_str) {
                None | Some("" | "querystring") => {}
                Some(other) => {
                    return Err(Error::paging(format!(
                        "location_to '{other}' is unimplemented"
                    )));
                }
            }

            let structure = request
                .settings
                .paging
                .get("indicator_from_structure")
                .cloned()
                .unwrap_or_default();
            match structure.as_str() {
                "full_url" => {
                    let JsonValue::String(next_url) = &indicator else {
                        warn!("[{}] full_url paging indicator is not a string", ep.name);
                        break;
                    };
                    request.url = request.url.join(next_url)?;
                }
                "calculated" => {
                    let Some(next_page) = indicator.as_f64() else {
                        warn!("[{}] calculated paging indicator is not numeric", ep.name);
                        break;
                    };
                    let field = indicator_to_field(&request.settings.paging);
                    request.set_query_param(&field, &format_float_plain(next_page));
                }
                _ => {
                    let JsonValue::String(value) = &indicator else {
                        warn!("[{}] paging indicator is not a string", ep.name);
                        break;
                    };
                    let field = indicator_to_field(&request.settings.paging);
                    request.set_query_param(&field, value);
                }
            }

            let authed = match adapter
                .authenticate(request.clone(), &root.auth_params)
                .await
            {
                Ok(authed) => authed,
                Err(e) => {
                    warn!("[{}] Authentication failed while paging: {e}", ep.name);
                    break;
                }
            };
            let HttpResponse {
                status,
                body,
                headers,
            } = run_request(&authed).await;
            if !(200..=299).contains(&status) {
                warn!(
                    "[{}] Expected new response status 2xx, got {status}",
                    ep.name
                );
            }

            if ep.keep_response() {
                responses
                    .entry(fingerprint.clone())
                    .or_default()
                    .extend_from_slice(&body);
            }

            let payload = if peek_from_headers { &headers } else { &body };
            (page_value, more_pages) = match adapter.paging_peek(
                payload,
                &response_keys,
                old_page_value.as_ref(),
                &root.paging_params,
            ) {
                Ok(peeked) => peeked,
                Err(e) => {
                    warn!("[{}] Paging peek failed: {e}", ep.name);
                    (None, false)
                }
            };
        }

        Ok(())
    }

    /// Synthesize and run child endpoints from values extracted out of a
    /// parent response.
    ///
    /// Boxed explicitly (rather than a plain `async fn`) so the compiler
    /// can prove this future is `Send` despite its mutual recursion with
    /// `run_endpoints` through the boxed call below.
    fn fan_out<'a>(
        &'a self,
        adapter: &'a dyn Adapter,
        root: &'a RootSettings,
        options: &'a HarvestOptions,
        reporter: &'a Reporter,
        ep: &'a EndpointDescriptor,
        parent_body: &'a [u8],
    ) -> BoxedEndpointRun<'a> {
        Box::pin(async move { self.fan_out_inner(adapter, root, options, reporter, ep, parent_body).await })
    }

    async fn fan_out_inner(
        &self,
        adapter: &dyn Adapter,
        root: &RootSettings,
        options: &HarvestOptions,
        reporter: &Reporter,
        ep: &EndpointDescriptor,
        parent_body: &[u8],
    ) -> Result<(ResponseMap, Vec<KeyRecord>)> {
        let mut responses = ResponseMap::new();
        let mut json_keys: Vec<KeyRecord> = Vec::new();

        for (parent_key_path, children) in &ep.endpoints {
            let normalized = match adapter.response_to_json(&ep.vars, parent_body) {
                Ok(normalized) => normalized,
                Err(e) => {
                    warn!("[{}] Response normalization failed: {e}", ep.name);
                    continue;
                }
            };
            let parsed: JsonValue = match serde_json::from_slice(&normalized) {
                Ok(value @ (JsonValue::Array(_) | JsonValue::Object(_))) => value,
                Ok(_) | Err(_) => {
                    warn!("[{}] Parent response is not a JSON structure", ep.name);
                    continue;
                }
            };

            let key_values = extract(&split_path(parent_key_path), &parsed);

            let mut holder: Vec<EndpointDescriptor> = Vec::new();
            for child in children {
                for (index, value) in key_values.iter().enumerate() {
                    let Some(endpoint_key) = scalar_to_string(value) else {
                        warn!(
                            "[{}] Unsupported endpoint key type at '{parent_key_path}'",
                            ep.name
                        );
                        continue;
                    };

                    let mut sub = child.fanout_clone();
                    for (source, target) in &child.endpoint_key_names {
                        if source == "{{endpoint_key}}" {
                            sub.endpoint_key_values
                                .insert(target.clone(), JsonValue::String(endpoint_key.clone()));
                            continue;
                        }
                        let sourced = extract(&split_path(source), &parsed);
                        if let Some(value) = sourced.get(index) {
                            sub.endpoint_key_values.insert(target.clone(), value.clone());
                        } else if let Some(parent_value) = ep.endpoint_key_values.get(target) {
                            sub.endpoint_key_values
                                .insert(target.clone(), parent_value.clone());
                        }
                    }

                    for (key, value) in &sub.endpoint_key_values {
                        if let JsonValue::String(s) = value {
                            sub.endpoint = template::replace_var(&sub.endpoint, key, s);
                        }
                    }
                    sub.vars
                        .insert("endpoint_key".to_string(), endpoint_key.clone());
                    holder.push(sub);
                }
            }

            // Indirect async recursion needs the boxed future; children
            // run with fan-out disabled, so the depth stops at one.
            let recursed: BoxedEndpointRun<'_> = Box::pin(self.run_endpoints(
                &holder, root, adapter, options, reporter, false,
            ));
            let (sub_responses, sub_keys) = recursed.await?;
            responses.extend(sub_responses);
            json_keys.extend(sub_keys);
        }

        Ok((responses, json_keys))
    }

    /// Best-effort dashboard report.
    async fn report(&self, reporter: &Reporter, options: &HarvestOptions, logs: Vec<ScanLog>) {
        if self.reporter_base_url.is_none() && std::env::var("DASHBOARD_API_URL").is_err() {
            return;
        }
        if let Err(e) = reporter.add_scan_logs(options.plugin_id, &logs).await {
            warn!("Error while updating plugin status: {e}");
        }
    }
}

impl Default for Harvester {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Splice caller-supplied parameters into a descriptor's `{{}}`
/// placeholders.
///
/// An empty descriptor list defers entirely to the caller; an empty caller
/// list leaves the descriptor's own values. Otherwise each placeholder
/// consumes the next caller entry in order. With `substring` true every
/// embedded `{{}}` occurrence is filled; otherwise only elements that are
/// exactly the placeholder are replaced.
fn splice_placeholder_params(
    configured: &[String],
    supplied: &[String],
    substring: bool,
) -> Vec<String> {
    if configured.is_empty() {
        return supplied.to_vec();
    }
    if supplied.is_empty() {
        return configured.to_vec();
    }

    let mut next = 0usize;
    let mut merged = Vec::with_capacity(configured.len());
    for param in configured {
        let mut param = param.clone();
        if substring {
            while param.contains("{{}}") && next < supplied.len() {
                param = param.replacen("{{}}", &supplied[next], 1);
                next += 1;
            }
        } else if param == "{{}}" && next < supplied.len() {
            param = supplied[next].clone();
            next += 1;
        }
        merged.push(param);
    }
    merged
}

/// Move the parameter bags onto the request: headers take the first value
/// of each list; querystring entries add every value, repeating the key
/// with a `[]` suffix when more than one is present.
fn apply_param_bags(request: &mut EffectiveRequest) {
    let EffectiveRequest {
        params,
        headers,
        url,
        ..
    } = request;

    let mut header_names: Vec<&String> = params.header.keys().collect();
    header_names.sort();
    for name in header_names {
        let Some(first) = params.header[name].first() else {
            continue;
        };
        let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
            warn!("Skipping invalid header name '{name}'");
            continue;
        };
        let Ok(header_value) = HeaderValue::from_str(first) else {
            warn!("Skipping invalid value for header '{name}'");
            continue;
        };
        headers.insert(header_name, header_value);
    }

    let mut query_names: Vec<&String> = params.querystring.keys().collect();
    query_names.sort();
    for name in query_names {
        let values = &params.querystring[name];
        if values.len() > 1 {
            for value in values {
                url.query_pairs_mut()
                    .append_pair(&format!("{name}[]"), value);
            }
        } else if let Some(value) = values.first() {
            url.query_pairs_mut().append_pair(name, value);
        }
    }
}

/// Build the key list handed to the peek.
///
/// The default is a plain split of `indicator_from_field`; `calculated`
/// paging carries three comma-separated paths and prefixes the list with
/// the segment lengths of the first two so the peek can cut it apart.
fn build_response_keys(paging: &StringMap) -> Result<Vec<String>> {
    let field = paging
        .get("indicator_from_field")
        .cloned()
        .unwrap_or_default();
    if paging.get("indicator_from_structure").map(String::as_str) == Some("calculated") {
        let separate: Vec<&str> = field.split(',').collect();
        if separate.len() != 3 {
            return Err(Error::CalculatedPagingKeys {
                got: separate.len(),
            });
        }
        let mut keys = vec![format!(
            "{},{}",
            separate[0].split('.').count(),
            separate[1].split('.').count()
        )];
        for path in separate {
            keys.extend(split_path(path));
        }
        Ok(keys)
    } else {
        Ok(split_path(&field))
    }
}

/// Query parameter that receives the paging indicator.
fn indicator_to_field(paging: &StringMap) -> String {
    paging
        .get("indicator_to_field")
        .cloned()
        .unwrap_or_default()
}

/// Coerce an extracted fan-out value to its string form.
///
/// Strings pass through; integers and floats format without an exponent;
/// anything else is unsupported.
fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().map(format_float_plain)
            }
        }
        _ => None,
    }
}

// ============================================================================
// Connection-check discrimination
// ============================================================================

enum CheckOutcome {
    /// Return this envelope without post-processing
    Envelope(Vec<u8>),
    /// Post-process this filtered selection
    Proceed(ResponseMap),
}

/// Decide what a connection-check run returns.
///
/// Entries with 2xx codes win outright. Failing that, bodies that are
/// empty, `[]`, or HTML mean bad credentials; a body with no JSON or XML
/// structure at all is surfaced verbatim; otherwise the first structured
/// entry goes through post-processing alone.
fn discriminate_connection_check(responses: &ResponseMap) -> Result<CheckOutcome> {
    let successes: ResponseMap = responses
        .iter()
        .filter(|(fingerprint, _)| (200..=299).contains(&fingerprint.response_code))
        .map(|(fingerprint, body)| (fingerprint.clone(), body.clone()))
        .collect();
    if !successes.is_empty() {
        return Ok(CheckOutcome::Proceed(successes));
    }

    let invalid_credentials = serde_json::to_vec(&json!({"Errors": "Invalid Credentials"}))?;
    let mut selected = ResponseMap::new();
    for (fingerprint, body) in responses {
        let text = String::from_utf8_lossy(body);
        if text.is_empty() || text == "[]" || text.contains("</html>") {
            return Ok(CheckOutcome::Envelope(invalid_credentials));
        }
        if !text.contains('{') && !text.contains('<') {
            let envelope = serde_json::to_vec(&json!({"Errors": text}))?;
            return Ok(CheckOutcome::Envelope(envelope));
        }
        selected.insert(fingerprint.clone(), body.clone());
        break;
    }
    Ok(CheckOutcome::Proceed(selected))
}
