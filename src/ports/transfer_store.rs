//! Transfer store port - durable record of transfers and their event history.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{BusinessUserId, Timestamp, TransferId};
use crate::domain::transfer::{Transfer, TransferEvent, TransferStatus};

/// Errors from store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Transfer {0} not found")]
    NotFound(TransferId),

    #[error("Database error: {0}")]
    Database(String),
}

/// Outcome of an insert attempt against the idempotency-key constraint.
///
/// Two concurrent creations with the same `(idempotency_key, business_user_id)`
/// must produce exactly one row; the loser observes the winner's row here
/// instead of racing to insert a duplicate.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// The row was inserted; this caller owns provider submission.
    Inserted,

    /// Another request with the same key already inserted; here is its row.
    DuplicateKey(Transfer),
}

/// Port for transfer persistence.
///
/// Implementations must make `insert` atomic with respect to the uniqueness
/// constraint on the idempotency key, and must never lose an `append_event`
/// under concurrent webhook deliveries for the same transfer.
#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Looks up a transfer by its idempotency pair.
    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
        business_user_id: &BusinessUserId,
    ) -> Result<Option<Transfer>, StoreError>;

    /// Inserts a new transfer, returning the existing row on key conflict.
    async fn insert(&self, transfer: &Transfer) -> Result<InsertOutcome, StoreError>;

    /// Records provider acceptance: external txn id plus the new status.
    async fn record_submission(
        &self,
        id: TransferId,
        external_txn_id: &str,
        status: &TransferStatus,
        updated_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Updates the status (and `updated_at`) of an existing transfer.
    async fn update_status(
        &self,
        id: TransferId,
        status: &TransferStatus,
        updated_at: Timestamp,
    ) -> Result<(), StoreError>;

    /// Appends one immutable event record. Never updates or deletes.
    async fn append_event(&self, event: &TransferEvent) -> Result<(), StoreError>;

    /// Looks up a transfer by its local id.
    async fn find_by_id(&self, id: TransferId) -> Result<Option<Transfer>, StoreError>;

    /// Returns the event history for a transfer, most recent first.
    async fn events_for(&self, id: TransferId) -> Result<Vec<TransferEvent>, StoreError>;
}
