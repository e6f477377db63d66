//! JSON request/response shapes for the transfer API.
//!
//! The wire format is camelCase; these types are the boundary between HTTP
//! and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::handlers::TransferWithEvents;
use crate::domain::transfer::{Transfer, TransferEvent};

/// Request body for `POST /api/payouts/interac`.
///
/// Every field is optional at the wire level; presence is checked by domain
/// validation so the 400 body can name the missing field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayoutRequest {
    pub business_user_id: Option<String>,
    pub amount_cents: Option<i64>,
    pub recipient_email: Option<String>,
    pub recipient_name: Option<String>,
    pub use_auto_deposit: Option<bool>,
    pub idempotency_key: Option<String>,
}

/// Compact transfer view returned from a fresh creation (201).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSummaryResponse {
    pub id: String,
    pub external_txn_id: Option<String>,
    pub status: String,
    pub amount: i64,
    pub currency: String,
}

impl From<&Transfer> for TransferSummaryResponse {
    fn from(transfer: &Transfer) -> Self {
        Self {
            id: transfer.id.to_string(),
            external_txn_id: transfer.external_txn_id.clone(),
            status: transfer.status.to_string(),
            amount: transfer.amount_cents,
            currency: transfer.currency.clone(),
        }
    }
}

/// Full transfer view for replays and the read path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub id: String,
    pub idempotency_key: String,
    pub business_user_id: String,
    pub recipient_email: String,
    pub recipient_name: String,
    pub amount_cents: i64,
    pub currency: String,
    pub use_auto_deposit: bool,
    pub external_txn_id: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Transfer> for TransferResponse {
    fn from(transfer: &Transfer) -> Self {
        Self {
            id: transfer.id.to_string(),
            idempotency_key: transfer.idempotency_key.clone(),
            business_user_id: transfer.business_user_id.as_str().to_string(),
            recipient_email: transfer.recipient_email.clone(),
            recipient_name: transfer.recipient_name.clone(),
            amount_cents: transfer.amount_cents,
            currency: transfer.currency.clone(),
            use_auto_deposit: transfer.use_auto_deposit,
            external_txn_id: transfer.external_txn_id.clone(),
            status: transfer.status.to_string(),
            created_at: transfer.created_at.as_datetime().to_rfc3339(),
            updated_at: transfer.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// 201 body: `{success, transfer}`.
#[derive(Debug, Clone, Serialize)]
pub struct PayoutCreatedResponse {
    pub success: bool,
    pub transfer: TransferSummaryResponse,
}

/// 200 replay body: `{transfer}`.
#[derive(Debug, Clone, Serialize)]
pub struct PayoutReplayResponse {
    pub transfer: TransferResponse,
}

/// One recorded webhook event in the read path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEventResponse {
    pub event_type: String,
    pub event_payload: serde_json::Value,
    pub received_at: String,
}

impl From<&TransferEvent> for TransferEventResponse {
    fn from(event: &TransferEvent) -> Self {
        Self {
            event_type: event.event_type.clone(),
            event_payload: event.event_payload.clone(),
            received_at: event.received_at.as_datetime().to_rfc3339(),
        }
    }
}

/// `GET /api/transfers/:id` body: `{transfer, events}`, events newest first.
#[derive(Debug, Clone, Serialize)]
pub struct TransferDetailResponse {
    pub transfer: TransferResponse,
    pub events: Vec<TransferEventResponse>,
}

impl From<TransferWithEvents> for TransferDetailResponse {
    fn from(result: TransferWithEvents) -> Self {
        Self {
            transfer: TransferResponse::from(&result.transfer),
            events: result.events.iter().map(TransferEventResponse::from).collect(),
        }
    }
}

/// Error body. 400s carry the offending field; 500s carry a message.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
            message: None,
        }
    }

    pub fn with_field(error: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: Some(field.into()),
            message: None,
        }
    }

    pub fn with_message(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
            message: Some(message.into()),
        }
    }
}
