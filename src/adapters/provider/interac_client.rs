//! Interac payout provider client.
//!
//! Implements the `PayoutProvider` port over the provider's HTTP API:
//! `POST {base}/v1/payouts/interac` with bearer-token auth and an
//! `Idempotency-Key` header. One best-effort call, 30 second timeout, no
//! retries.
//!
//! # Security
//!
//! The API key is held in `secrecy::SecretString` and only exposed at the
//! moment the request is built.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use crate::ports::{PayoutAcceptance, PayoutProvider, PayoutSubmission, ProviderError};

/// Default per-call timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Interac API configuration.
#[derive(Clone)]
pub struct InteracConfig {
    /// Bearer token for the provider API.
    api_key: SecretString,

    /// Base URL for the provider API.
    base_url: String,

    /// Per-call timeout in seconds.
    timeout_secs: u64,
}

impl InteracConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Override the per-call timeout (for testing).
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Interac payout provider client.
pub struct InteracClient {
    config: InteracConfig,
    http_client: reqwest::Client,
}

/// Provider acceptance response body.
#[derive(Debug, Deserialize)]
struct PayoutResponseBody {
    id: String,
    status: Option<String>,
}

impl InteracClient {
    pub fn new(config: InteracConfig) -> Result<Self, ProviderError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

/// Renders cents as the provider's decimal-string amount, e.g. `5000` as
/// `"50.00"`.
fn format_amount(amount_cents: i64) -> String {
    format!("{}.{:02}", amount_cents / 100, amount_cents % 100)
}

fn build_request_body(submission: &PayoutSubmission) -> serde_json::Value {
    serde_json::json!({
        "amount": format_amount(submission.amount_cents),
        "currency": submission.currency,
        "recipient": {
            "email": submission.recipient_email,
            "name": submission.recipient_name,
        },
        "autoDeposit": submission.auto_deposit,
        "reference": submission.reference.to_string(),
        "metadata": {
            "localTransferId": submission.reference.to_string(),
            "businessUserId": submission.business_user_id.as_str(),
        },
    })
}

#[async_trait]
impl PayoutProvider for InteracClient {
    async fn submit_payout(
        &self,
        submission: PayoutSubmission,
    ) -> Result<PayoutAcceptance, ProviderError> {
        let url = format!("{}/v1/payouts/interac", self.config.base_url);
        let body = build_request_body(&submission);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .header("Idempotency-Key", &submission.idempotency_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                reference = %submission.reference,
                "Provider rejected payout submission"
            );
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: PayoutResponseBody = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(PayoutAcceptance {
            external_txn_id: parsed.id,
            status: parsed.status,
        })
    }
}
