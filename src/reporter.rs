//! Dashboard progress reporter
//!
//! Posts short scan log entries to an external dashboard before and during
//! a scan. Strictly best-effort: failures are surfaced as errors for the
//! caller to log, and never abort the run.

use crate::error::{Error, Result};
use serde::Serialize;

/// Reporter credentials and target
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    api_key: String,
    api_secret: String,
    base_url: Option<String>,
}

/// One scan log entry
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanLog {
    pub log_type: String,
    pub text: String,
    pub additional_text_type: String,
    pub additional_text: String,
}

impl ScanLog {
    /// A plain plugin log line.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            log_type: "plugin".to_string(),
            text: text.into(),
            ..Default::default()
        }
    }

    /// An indented informational line attached to the previous entry.
    pub fn info(additional_text: impl Into<String>) -> Self {
        Self {
            log_type: "plugin".to_string(),
            additional_text_type: "info".to_string(),
            additional_text: additional_text.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
struct ScanLogEntries<'a> {
    scan_log_entries: &'a [ScanLog],
}

impl Reporter {
    /// Create a reporter with dashboard credentials.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: None,
        }
    }

    /// Override the dashboard base URL (otherwise `DASHBOARD_API_URL`).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Post scan log entries for a plugin.
    pub async fn add_scan_logs(&self, plugin_id: i64, scan_logs: &[ScanLog]) -> Result<()> {
        let base = match &self.base_url {
            Some(base) => base.clone(),
            None => std::env::var("DASHBOARD_API_URL").unwrap_or_default(),
        };
        let url = format!("{base}/api/v1/user_plugins/{plugin_id}/add_scan_logs.json");

        let client = reqwest::Client::new();
        let response = client
            .post(&url)
            .header(
                "Authorization",
                format!("Token {}:{}", self.api_key, self.api_secret),
            )
            .header("Content-Type", "application/json")
            .json(&ScanLogEntries {
                scan_log_entries: scan_logs,
            })
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Other(format!(
                "Failed to update plugin status, status code {}. Response body: {body}",
                status.as_u16()
            )));
        }
        Ok(())
    }
}
