//! Transfer aggregate and its append-only event log.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{BusinessUserId, Timestamp, TransferId};

use super::errors::TransferError;
use super::status::TransferStatus;

/// Maximum amount per transfer: $25,000.00 CAD.
pub const AMOUNT_CEILING_CENTS: i64 = 2_500_000;

/// The only settlement currency handled by this gateway.
pub const CURRENCY: &str = "CAD";

/// The unit of work: one requested payout, from creation through settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// Locally generated identifier; immutable once created.
    pub id: TransferId,

    /// Client-supplied deduplication token, unique per business user.
    pub idempotency_key: String,

    /// Initiating business account.
    pub business_user_id: BusinessUserId,

    /// Destination identity; immutable after creation.
    pub recipient_email: String,
    pub recipient_name: String,

    /// Amount in cents, within (0, AMOUNT_CEILING_CENTS].
    pub amount_cents: i64,

    /// Always "CAD".
    pub currency: String,

    /// Forwarded to the provider verbatim.
    pub use_auto_deposit: bool,

    /// Provider-assigned identifier; set at most once, on acceptance.
    pub external_txn_id: Option<String>,

    /// Current lifecycle status.
    pub status: TransferStatus,

    pub created_at: Timestamp,

    /// Refreshed on every status change.
    pub updated_at: Timestamp,
}

impl Transfer {
    /// Records provider acceptance: the external id and the provider's
    /// reported status, falling back to `submitted` when none was reported.
    pub fn record_submission(&mut self, external_txn_id: String, reported_status: Option<&str>) {
        self.external_txn_id = Some(external_txn_id);
        self.status = match reported_status {
            Some(raw) => super::status::apply_provider_status(&self.status, raw),
            None => TransferStatus::Submitted,
        };
        self.updated_at = Timestamp::now();
    }

    /// Applies a provider-reported status from a webhook.
    pub fn apply_status(&mut self, raw_provider_status: &str) {
        self.status = super::status::apply_provider_status(&self.status, raw_provider_status);
        self.updated_at = Timestamp::now();
    }
}

/// Validated input for creating a transfer.
///
/// Construction is the validation boundary: a `NewTransfer` that exists has
/// already passed the field and limit checks, in the order required (missing
/// fields, then amount bounds, then idempotency key).
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub business_user_id: BusinessUserId,
    pub recipient_email: String,
    pub recipient_name: String,
    pub amount_cents: i64,
    pub use_auto_deposit: bool,
    pub idempotency_key: String,
}

impl NewTransfer {
    /// Validates raw request fields into a `NewTransfer`.
    #[allow(clippy::too_many_arguments)]
    pub fn validate(
        business_user_id: Option<String>,
        amount_cents: Option<i64>,
        recipient_email: Option<String>,
        recipient_name: Option<String>,
        use_auto_deposit: Option<bool>,
        idempotency_key: Option<String>,
    ) -> Result<Self, TransferError> {
        let business_user_id = business_user_id
            .and_then(BusinessUserId::new)
            .ok_or_else(|| TransferError::validation("businessUserId", "is required"))?;

        let amount_cents =
            amount_cents.ok_or_else(|| TransferError::validation("amountCents", "is required"))?;

        let recipient_email = require_non_empty("recipientEmail", recipient_email)?;
        let recipient_name = require_non_empty("recipientName", recipient_name)?;

        if amount_cents <= 0 {
            return Err(TransferError::validation(
                "amountCents",
                "must be greater than zero",
            ));
        }
        if amount_cents > AMOUNT_CEILING_CENTS {
            return Err(TransferError::LimitExceeded {
                amount_cents,
                limit_cents: AMOUNT_CEILING_CENTS,
            });
        }

        let idempotency_key = require_non_empty("idempotencyKey", idempotency_key)?;

        Ok(Self {
            business_user_id,
            recipient_email,
            recipient_name,
            amount_cents,
            use_auto_deposit: use_auto_deposit.unwrap_or(true),
            idempotency_key,
        })
    }

    /// Materializes the initial `created` transfer record.
    pub fn into_transfer(self) -> Transfer {
        let now = Timestamp::now();
        Transfer {
            id: TransferId::new(),
            idempotency_key: self.idempotency_key,
            business_user_id: self.business_user_id,
            recipient_email: self.recipient_email,
            recipient_name: self.recipient_name,
            amount_cents: self.amount_cents,
            currency: CURRENCY.to_string(),
            use_auto_deposit: self.use_auto_deposit,
            external_txn_id: None,
            status: TransferStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }
}

fn require_non_empty(field: &str, value: Option<String>) -> Result<String, TransferError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(TransferError::validation(field, "is required")),
    }
}

/// Append-only log entry recording one received webhook.
///
/// Events are never updated or deleted; the log is the audit trail
/// independent of the transfer's current status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferEvent {
    /// The owning transfer.
    pub transfer_id: TransferId,

    /// Provider-supplied classification string.
    pub event_type: String,

    /// Full provider payload, stored verbatim for audit/replay.
    pub event_payload: Value,

    pub received_at: Timestamp,
}

impl TransferEvent {
    pub fn new(transfer_id: TransferId, event_type: impl Into<String>, event_payload: Value) -> Self {
        Self {
            transfer_id,
            event_type: event_type.into(),
            event_payload,
            received_at: Timestamp::now(),
        }
    }
}
