use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upstream client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// API base URL, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Secret API key. Empty means "not configured" and fails client
    /// construction.
    #[serde(default)]
    pub secret_key: String,

    /// Page size for the listing call.
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Hard cap on records fetched across all pages in one cycle. Bounds
    /// cycle latency, since per-payment lookups run sequentially.
    #[serde(default = "default_max_records")]
    pub max_records: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            secret_key: String::new(),
            page_limit: default_page_limit(),
            max_records: default_max_records(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl UpstreamConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_page_limit() -> usize {
    100
}

fn default_max_records() -> usize {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}
