//! Descriptor types
//!
//! Declarative endpoint descriptor types for YAML parsing. A descriptor
//! file carries one root with inheritable settings and an ordered tree of
//! endpoints.

use crate::types::{JsonValue, MultiMap, StringMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Root Descriptor
// ============================================================================

/// Top-level descriptor loaded from one YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Descriptor {
    /// Descriptor name, inherited by endpoints that don't set their own
    pub name: String,
    /// Adapter identifier resolved through the registry
    #[serde(default)]
    pub plugin: String,
    /// Paging configuration, inherited by endpoints that don't override it
    #[serde(default)]
    pub paging: StringMap,
    /// Matrix expansion values: each key's value list multiplies the
    /// descriptor into one copy per combination
    #[serde(default)]
    pub vars_data: HashMap<String, Vec<String>>,
    /// Static substitutions available to every endpoint
    #[serde(default)]
    pub vars: StringMap,
    /// Like `vars`, but applied at every endpoint even when the endpoint
    /// defines no vars of its own
    #[serde(default)]
    pub global_vars: StringMap,
    /// Auth parameters; `{{}}` placeholders are filled from the caller's list
    #[serde(default)]
    pub auth_params: Vec<String>,
    /// Peek parameters; `{{}}` placeholders are filled from the caller's list
    #[serde(default)]
    pub paging_params: Vec<String>,
    /// Disables the default JSON content type on outgoing requests
    #[serde(default)]
    pub skip_content_type: bool,
    /// Ordered endpoint sequence
    #[serde(default)]
    pub endpoints: Vec<EndpointDescriptor>,
}

// ============================================================================
// Endpoint Descriptor
// ============================================================================

/// One endpoint in a descriptor tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EndpointDescriptor {
    /// Endpoint name, required at every level
    pub name: String,
    /// URL template
    #[serde(default)]
    pub endpoint: String,
    /// Local static substitutions
    #[serde(default)]
    pub vars: StringMap,
    /// Skip this endpoint when any var binding matches one of these values
    #[serde(default)]
    pub skip_endpoint: HashMap<String, Vec<String>>,
    /// Paging override for this endpoint
    #[serde(default)]
    pub paging: StringMap,
    /// When the literal "false", response bytes are not accumulated
    #[serde(default, rename = "return")]
    pub returns: String,
    /// Include this endpoint in connection-check runs
    #[serde(default)]
    pub use_for_connection_check: bool,
    /// Exclude this endpoint from scan runs
    #[serde(default)]
    pub skip_for_scans: bool,
    /// Source dotted paths into the response, renamed pairwise
    #[serde(default)]
    pub current_base_key: Vec<String>,
    /// Target dotted paths in the merged document, parallel to
    /// `current_base_key`
    #[serde(default)]
    pub desired_base_key: Vec<String>,
    /// Source dotted paths for error branches
    #[serde(default)]
    pub current_error_key: Vec<String>,
    /// Target dotted paths for error branches
    #[serde(default)]
    pub desired_error_key: Vec<String>,
    /// Source path (or the literal `{{endpoint_key}}`) to target attribute
    /// name, used to carry parent attributes into fan-out children
    #[serde(default)]
    pub endpoint_key_names: StringMap,
    /// Parent-derived attributes, populated at run time during fan-out
    #[serde(skip)]
    pub endpoint_key_values: HashMap<String, JsonValue>,
    /// Free-form documentation, substitution applies here too
    #[serde(default)]
    pub documentation: String,
    /// Parameter bags
    #[serde(default)]
    pub params: ParamBags,
    /// Child endpoint groups keyed by the parent response path whose
    /// extracted values parameterize them
    #[serde(default)]
    pub endpoints: HashMap<String, Vec<EndpointDescriptor>>,
}

impl EndpointDescriptor {
    /// Whether accumulated responses from this endpoint should be kept.
    pub fn keep_response(&self) -> bool {
        self.returns != "false"
    }

    /// Clone this endpoint for fan-out instantiation.
    ///
    /// Carries the declarative shape (name, vars, paging, keys, params,
    /// nested endpoints) while resetting the run-time and skip state: each
    /// child instance gets fresh `endpoint_key_values` and does not
    /// inherit the parent's skip flags.
    pub fn fanout_clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            endpoint: self.endpoint.clone(),
            vars: self.vars.clone(),
            skip_endpoint: HashMap::new(),
            paging: self.paging.clone(),
            returns: self.returns.clone(),
            use_for_connection_check: self.use_for_connection_check,
            skip_for_scans: false,
            current_base_key: self.current_base_key.clone(),
            desired_base_key: self.desired_base_key.clone(),
            current_error_key: self.current_error_key.clone(),
            desired_error_key: self.desired_error_key.clone(),
            endpoint_key_names: self.endpoint_key_names.clone(),
            endpoint_key_values: HashMap::new(),
            documentation: self.documentation.clone(),
            params: self.params.clone(),
            endpoints: self.endpoints.clone(),
        }
    }
}

// ============================================================================
// Parameter Bags
// ============================================================================

/// The three request parameter bags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ParamBags {
    /// Query string parameters; multiple values repeat the key with a
    /// `[]` suffix
    #[serde(default)]
    pub querystring: MultiMap,
    /// Header parameters; only the first value of each list is sent
    #[serde(default)]
    pub header: MultiMap,
    /// Body parameters (reserved)
    #[serde(default)]
    pub body: MultiMap,
}

impl ParamBags {
    /// True when no bag carries any entry.
    pub fn is_empty(&self) -> bool {
        self.querystring.is_empty() && self.header.is_empty() && self.body.is_empty()
    }
}
