//! Payout provider port - the external money-movement service.
//!
//! The provider is a black box reachable over HTTP: it accepts a submission,
//! returns an identifier and a status, and later delivers webhook events.
//! One best-effort call per request; retry policy is out of scope.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{BusinessUserId, TransferId};

/// Errors from the provider call. All of them leave the local transfer in
/// `created` status; the caller surfaces them without retrying.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Network(String),

    #[error("Provider call timed out")]
    Timeout,

    #[error("Provider rejected the submission ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Provider returned an unreadable response: {0}")]
    InvalidResponse(String),
}

/// One payout submission toward the provider.
#[derive(Debug, Clone)]
pub struct PayoutSubmission {
    /// Local transfer id, forwarded as the provider-side reference and in
    /// metadata so webhooks can be correlated back.
    pub reference: TransferId,

    pub business_user_id: BusinessUserId,
    pub amount_cents: i64,
    pub currency: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub auto_deposit: bool,

    /// Forwarded as the provider-level `Idempotency-Key` header.
    pub idempotency_key: String,
}

/// The provider's acceptance of a submission.
#[derive(Debug, Clone)]
pub struct PayoutAcceptance {
    /// Provider transaction id.
    pub external_txn_id: String,

    /// Provider-reported status, if any.
    pub status: Option<String>,
}

/// Port for submitting payouts to the external provider.
#[async_trait]
pub trait PayoutProvider: Send + Sync {
    /// Submits a payout. The call carries a bounded timeout; on expiry the
    /// implementation returns `ProviderError::Timeout`.
    async fn submit_payout(
        &self,
        submission: PayoutSubmission,
    ) -> Result<PayoutAcceptance, ProviderError>;
}
