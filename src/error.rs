//! Error types for the harvesting engine
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the harvester
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Current and desired key lists must be the same length in endpoint '{endpoint}'")]
    KeyListMismatch { endpoint: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Template Errors
    // ============================================================================
    #[error("Template error: {message}")]
    Template { message: String },

    #[error("Invalid time token '{token}': {message}")]
    TimeToken { token: String, message: String },

    // ============================================================================
    // Paging Errors
    // ============================================================================
    #[error("Paging error: {message}")]
    Paging { message: String },

    #[error("Calculated paging requires three comma-separated key paths, got {got}")]
    CalculatedPagingKeys { got: usize },

    // ============================================================================
    // Adapter Errors
    // ============================================================================
    #[error("Unknown adapter '{plugin}'")]
    UnknownAdapter { plugin: String },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Key path error: {message}")]
    KeyPath { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("XML parsing error: {message}")]
    XmlParse { message: String },

    #[error("Post-processing error: {message}")]
    PostProcess { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Create a time token error
    pub fn time_token(token: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TimeToken {
            token: token.into(),
            message: message.into(),
        }
    }

    /// Create a paging error
    pub fn paging(message: impl Into<String>) -> Self {
        Self::Paging {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a key path error
    pub fn key_path(message: impl Into<String>) -> Self {
        Self::KeyPath {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a post-processing error
    pub fn post_process(message: impl Into<String>) -> Self {
        Self::PostProcess {
            message: message.into(),
        }
    }

    /// Whether this error is a fatal configuration error (aborts the
    /// current descriptor) as opposed to a per-endpoint operational one.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::KeyListMismatch { .. }
                | Error::YamlParse(_)
                | Error::TimeToken { .. }
                | Error::CalculatedPagingKeys { .. }
                | Error::UnknownAdapter { .. }
        )
    }
}

/// Result type alias for the harvester
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }
}
