//! Payout provider configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payout provider configuration (Interac API)
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Bearer token for the provider API
    pub api_key: String,

    /// Shared secret for webhook signature verification
    pub webhook_secret: String,

    /// Base URL for the provider API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PROVIDER__API_KEY"));
        }
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("PROVIDER__WEBHOOK_SECRET"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidProviderUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidProviderTimeout);
        }
        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            webhook_secret: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.interac.example.com".to_string()
}

fn default_timeout() -> u64 {
    30
}
