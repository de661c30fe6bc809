//! Webhook notifier configuration.

use serde::Deserialize;

/// Public IFTTT maker endpoint.
pub const DEFAULT_BASE_URL: &str = "https://maker.ifttt.com";

/// Configuration for the webhook notifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Maker key; without one every trigger is refused.
    pub key: Option<String>,
    /// Endpoint base URL, without trailing slash.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl WebhookConfig {
    /// Config for `key` against the public endpoint.
    #[must_use]
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Self::default()
        }
    }
}
