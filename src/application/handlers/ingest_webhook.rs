//! IngestWebhookHandler - drives the reconciliation flow.
//!
//! Signature check, event lookup, state machine application, event log
//! append. Unmatched events are acknowledged and dropped so the provider
//! does not retry indefinitely; only signature failures are rejected.

use std::sync::Arc;

use crate::domain::foundation::Timestamp;
use crate::domain::transfer::{TransferError, TransferEvent, TransferStatus};
use crate::domain::webhook::{verify_signature, ProviderEvent};
use crate::ports::TransferStore;

/// Command carrying one raw webhook delivery.
#[derive(Debug, Clone)]
pub struct IngestWebhookCommand {
    /// Raw request body, exactly as received (the signature covers it).
    pub payload: Vec<u8>,

    /// Hex HMAC-SHA256 from the `X-Webhook-Signature` header, if present.
    pub signature: Option<String>,
}

/// Outcome of ingesting a webhook. All variants are acknowledged with 200.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestWebhookOutcome {
    /// The transfer's status was updated and an event appended.
    Applied {
        transfer_id: crate::domain::foundation::TransferId,
        status: TransferStatus,
    },

    /// Verified but unmatched (no metadata, unknown transfer): dropped with
    /// zero store mutations.
    Ignored,
}

/// Handler for inbound provider webhooks.
pub struct IngestWebhookHandler {
    store: Arc<dyn TransferStore>,
    webhook_secret: String,
}

impl IngestWebhookHandler {
    pub fn new(store: Arc<dyn TransferStore>, webhook_secret: impl Into<String>) -> Self {
        Self {
            store,
            webhook_secret: webhook_secret.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: IngestWebhookCommand,
    ) -> Result<IngestWebhookOutcome, TransferError> {
        // 1. Verify the signature over the raw body. Missing or mismatched
        //    signatures reject the event; the provider retries on non-2xx.
        let signature = cmd.signature.as_deref().unwrap_or("");
        if !verify_signature(&cmd.payload, signature, &self.webhook_secret) {
            tracing::warn!("Webhook rejected: invalid or missing signature");
            return Err(TransferError::InvalidSignature);
        }

        // 2. Parse the envelope. A verified but malformed body is treated
        //    like an unmatched event: acknowledged, dropped.
        let event: ProviderEvent = match serde_json::from_slice(&cmd.payload) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Webhook dropped: unparseable body");
                return Ok(IngestWebhookOutcome::Ignored);
            }
        };

        // 3. Correlate back to a local transfer via metadata.
        let transfer_id = match event.local_transfer_id() {
            Some(id) => id,
            None => {
                tracing::warn!(
                    event_type = %event.event_type,
                    provider_txn_id = %event.data.id,
                    "Webhook dropped: no local transfer reference"
                );
                return Ok(IngestWebhookOutcome::Ignored);
            }
        };

        let mut transfer = match self.store.find_by_id(transfer_id).await? {
            Some(transfer) => transfer,
            None => {
                tracing::warn!(
                    transfer_id = %transfer_id,
                    event_type = %event.event_type,
                    "Webhook dropped: unknown transfer"
                );
                return Ok(IngestWebhookOutcome::Ignored);
            }
        };

        // 4. Apply the transition and persist status + event as one logical
        //    unit. The append must never be lost; last-write-wins on status
        //    is acceptable.
        transfer.apply_status(&event.data.status);
        self.store
            .update_status(transfer.id, &transfer.status, transfer.updated_at)
            .await?;

        let payload: serde_json::Value = serde_json::from_slice(&cmd.payload)
            .unwrap_or(serde_json::Value::Null);
        let record = TransferEvent {
            transfer_id: transfer.id,
            event_type: event.event_type.clone(),
            event_payload: payload,
            received_at: Timestamp::now(),
        };
        self.store.append_event(&record).await?;

        tracing::info!(
            transfer_id = %transfer.id,
            event_type = %event.event_type,
            status = %transfer.status,
            "Webhook applied"
        );

        Ok(IngestWebhookOutcome::Applied {
            transfer_id: transfer.id,
            status: transfer.status,
        })
    }
}
