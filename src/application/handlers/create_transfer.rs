//! CreateTransferHandler - drives the idempotent creation flow.
//!
//! Validation, idempotency check, local insert, provider submission, status
//! update. The idempotency check-then-insert is closed against concurrent
//! identical requests by the store's insert-returning-existing primitive:
//! exactly one row is inserted and exactly one provider submission is made.

use std::sync::Arc;

use crate::domain::transfer::{NewTransfer, Transfer, TransferError};
use crate::ports::{InsertOutcome, PayoutProvider, PayoutSubmission, StoreError, TransferStore};

/// Command to create a transfer. Raw request fields; validation happens in
/// the handler so field-level errors surface in order.
#[derive(Debug, Clone, Default)]
pub struct CreateTransferCommand {
    pub business_user_id: Option<String>,
    pub amount_cents: Option<i64>,
    pub recipient_email: Option<String>,
    pub recipient_name: Option<String>,
    pub use_auto_deposit: Option<bool>,
    pub idempotency_key: Option<String>,
}

/// Outcome of a creation request.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateTransferOutcome {
    /// A new transfer was created and submitted to the provider.
    Created(Transfer),

    /// The idempotency pair matched an existing transfer; returned unchanged,
    /// no provider call made.
    AlreadyProcessed(Transfer),
}

impl CreateTransferOutcome {
    pub fn transfer(&self) -> &Transfer {
        match self {
            CreateTransferOutcome::Created(t) | CreateTransferOutcome::AlreadyProcessed(t) => t,
        }
    }
}

/// Handler for the creation flow (submission orchestration).
pub struct CreateTransferHandler {
    store: Arc<dyn TransferStore>,
    provider: Arc<dyn PayoutProvider>,
}

impl CreateTransferHandler {
    pub fn new(store: Arc<dyn TransferStore>, provider: Arc<dyn PayoutProvider>) -> Self {
        Self { store, provider }
    }

    pub async fn handle(
        &self,
        cmd: CreateTransferCommand,
    ) -> Result<CreateTransferOutcome, TransferError> {
        // 1. Validate before any state mutation.
        let new_transfer = NewTransfer::validate(
            cmd.business_user_id,
            cmd.amount_cents,
            cmd.recipient_email,
            cmd.recipient_name,
            cmd.use_auto_deposit,
            cmd.idempotency_key,
        )?;

        // 2. Idempotency check: an existing pair short-circuits the flow.
        if let Some(existing) = self
            .store
            .find_by_idempotency_key(&new_transfer.idempotency_key, &new_transfer.business_user_id)
            .await?
        {
            tracing::info!(
                transfer_id = %existing.id,
                idempotency_key = %existing.idempotency_key,
                "Idempotent replay, returning existing transfer"
            );
            return Ok(CreateTransferOutcome::AlreadyProcessed(existing));
        }

        // 3. Insert the `created` row. A concurrent twin loses the race here
        //    and observes the winner's row.
        let mut transfer = new_transfer.into_transfer();
        match self.store.insert(&transfer).await? {
            InsertOutcome::Inserted => {}
            InsertOutcome::DuplicateKey(existing) => {
                tracing::info!(
                    transfer_id = %existing.id,
                    "Lost creation race, returning existing transfer"
                );
                return Ok(CreateTransferOutcome::AlreadyProcessed(existing));
            }
        }

        // 4. One best-effort provider call.
        let submission = PayoutSubmission {
            reference: transfer.id,
            business_user_id: transfer.business_user_id.clone(),
            amount_cents: transfer.amount_cents,
            currency: transfer.currency.clone(),
            recipient_email: transfer.recipient_email.clone(),
            recipient_name: transfer.recipient_name.clone(),
            auto_deposit: transfer.use_auto_deposit,
            idempotency_key: transfer.idempotency_key.clone(),
        };

        let acceptance = match self.provider.submit_payout(submission).await {
            Ok(acceptance) => acceptance,
            Err(e) => {
                // The row stays `created` with no external id; recoverable
                // only via a future reconciliation path.
                tracing::error!(
                    transfer_id = %transfer.id,
                    error = %e,
                    "Provider submission failed, transfer left in created status"
                );
                return Err(TransferError::provider(e.to_string()));
            }
        };

        // 5. Persist acceptance: external id plus reported status.
        transfer.record_submission(
            acceptance.external_txn_id.clone(),
            acceptance.status.as_deref(),
        );
        self.store
            .record_submission(
                transfer.id,
                &acceptance.external_txn_id,
                &transfer.status,
                transfer.updated_at,
            )
            .await?;

        tracing::info!(
            transfer_id = %transfer.id,
            external_txn_id = %acceptance.external_txn_id,
            status = %transfer.status,
            "Transfer submitted"
        );

        Ok(CreateTransferOutcome::Created(transfer))
    }
}

impl From<StoreError> for TransferError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => TransferError::NotFound(id),
            StoreError::Database(msg) => TransferError::internal(msg),
        }
    }
}
