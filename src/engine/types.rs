//! Engine types
//!
//! Options for a harvest run and the root settings snapshot shared by all
//! endpoints of one expanded descriptor.

use crate::types::{RuntimeParams, StringMap};
use std::path::PathBuf;

// ============================================================================
// Harvest Options
// ============================================================================

/// Options for one harvest run
#[derive(Debug, Clone, Default)]
pub struct HarvestOptions {
    /// Directory holding the descriptor YAML files
    pub config_dir: PathBuf,
    /// Caller-supplied auth parameters, spliced into `{{}}` placeholders
    pub auth_params: Vec<String>,
    /// Caller-supplied peek parameters, spliced into `{{}}` placeholders
    pub peek_params: Vec<String>,
    /// Parameters handed to the post-process hook
    pub post_params: Vec<String>,
    /// Per-endpoint runtime parameter overrides
    pub runtime_params: RuntimeParams,
    /// Connection-check mode: only endpoints marked for it run, and
    /// response codes are preserved for discrimination
    pub connection_only: bool,
    /// Dashboard API key
    pub api_key: String,
    /// Dashboard API secret
    pub api_secret: String,
    /// Dashboard plugin id
    pub plugin_id: i64,
}

impl HarvestOptions {
    /// Create options for a config directory.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            ..Default::default()
        }
    }

    /// Set auth parameters
    #[must_use]
    pub fn with_auth_params(mut self, params: Vec<String>) -> Self {
        self.auth_params = params;
        self
    }

    /// Set peek parameters
    #[must_use]
    pub fn with_peek_params(mut self, params: Vec<String>) -> Self {
        self.peek_params = params;
        self
    }

    /// Set post-process parameters
    #[must_use]
    pub fn with_post_params(mut self, params: Vec<String>) -> Self {
        self.post_params = params;
        self
    }

    /// Set runtime parameter overrides
    #[must_use]
    pub fn with_runtime_params(mut self, params: RuntimeParams) -> Self {
        self.runtime_params = params;
        self
    }

    /// Run in connection-check mode
    #[must_use]
    pub fn connection_only(mut self, connection_only: bool) -> Self {
        self.connection_only = connection_only;
        self
    }

    /// Set dashboard credentials and plugin id
    #[must_use]
    pub fn with_dashboard(
        mut self,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        plugin_id: i64,
    ) -> Self {
        self.api_key = api_key.into();
        self.api_secret = api_secret.into();
        self.plugin_id = plugin_id;
        self
    }
}

// ============================================================================
// Root Settings
// ============================================================================

/// Inheritable settings of one expanded descriptor, merged with the
/// caller's parameter lists
#[derive(Debug, Clone, Default)]
pub struct RootSettings {
    /// Descriptor name, the fallback endpoint name
    pub name: String,
    /// Root static substitutions
    pub vars: StringMap,
    /// Root paging configuration
    pub paging: StringMap,
    /// Merged auth parameters
    pub auth_params: Vec<String>,
    /// Merged peek parameters
    pub paging_params: Vec<String>,
    /// Substitutions applied at every endpoint
    pub global_vars: StringMap,
    /// Disables the default JSON content type
    pub skip_content_type: bool,
}
