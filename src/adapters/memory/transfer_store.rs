//! In-memory transfer store for tests and local runs.
//!
//! Honors the same uniqueness contract as the Postgres adapter: inserting a
//! second transfer with an existing `(idempotency_key, business_user_id)`
//! pair returns the stored row instead of creating a duplicate.
//!
//! Uses `.expect()` on lock operations which will panic if locks are
//! poisoned. Production deployments use the Postgres adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{BusinessUserId, Timestamp, TransferId};
use crate::domain::transfer::{Transfer, TransferEvent, TransferStatus};
use crate::ports::{InsertOutcome, StoreError, TransferStore};

/// In-memory `TransferStore`.
pub struct InMemoryTransferStore {
    transfers: RwLock<HashMap<TransferId, Transfer>>,
    events: RwLock<Vec<TransferEvent>>,
}

impl InMemoryTransferStore {
    pub fn new() -> Self {
        Self {
            transfers: RwLock::new(HashMap::new()),
            events: RwLock::new(Vec::new()),
        }
    }

    /// Total number of stored transfers (for test assertions).
    pub fn transfer_count(&self) -> usize {
        self.transfers
            .read()
            .expect("InMemoryTransferStore: transfers lock poisoned")
            .len()
    }

    /// Total number of appended events (for test assertions).
    pub fn event_count(&self) -> usize {
        self.events
            .read()
            .expect("InMemoryTransferStore: events lock poisoned")
            .len()
    }
}

impl Default for InMemoryTransferStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferStore for InMemoryTransferStore {
    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
        business_user_id: &BusinessUserId,
    ) -> Result<Option<Transfer>, StoreError> {
        Ok(self
            .transfers
            .read()
            .expect("InMemoryTransferStore: transfers lock poisoned")
            .values()
            .find(|t| {
                t.idempotency_key == idempotency_key && &t.business_user_id == business_user_id
            })
            .cloned())
    }

    async fn insert(&self, transfer: &Transfer) -> Result<InsertOutcome, StoreError> {
        let mut transfers = self
            .transfers
            .write()
            .expect("InMemoryTransferStore: transfers write lock poisoned");

        if let Some(existing) = transfers.values().find(|t| {
            t.idempotency_key == transfer.idempotency_key
                && t.business_user_id == transfer.business_user_id
        }) {
            return Ok(InsertOutcome::DuplicateKey(existing.clone()));
        }

        transfers.insert(transfer.id, transfer.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn record_submission(
        &self,
        id: TransferId,
        external_txn_id: &str,
        status: &TransferStatus,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut transfers = self
            .transfers
            .write()
            .expect("InMemoryTransferStore: transfers write lock poisoned");
        let transfer = transfers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        transfer.external_txn_id = Some(external_txn_id.to_string());
        transfer.status = status.clone();
        transfer.updated_at = updated_at;
        Ok(())
    }

    async fn update_status(
        &self,
        id: TransferId,
        status: &TransferStatus,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let mut transfers = self
            .transfers
            .write()
            .expect("InMemoryTransferStore: transfers write lock poisoned");
        let transfer = transfers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        transfer.status = status.clone();
        transfer.updated_at = updated_at;
        Ok(())
    }

    async fn append_event(&self, event: &TransferEvent) -> Result<(), StoreError> {
        self.events
            .write()
            .expect("InMemoryTransferStore: events write lock poisoned")
            .push(event.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TransferId) -> Result<Option<Transfer>, StoreError> {
        Ok(self
            .transfers
            .read()
            .expect("InMemoryTransferStore: transfers lock poisoned")
            .get(&id)
            .cloned())
    }

    async fn events_for(&self, id: TransferId) -> Result<Vec<TransferEvent>, StoreError> {
        // Insertion order is chronological; the contract is newest first.
        let mut events: Vec<_> = self
            .events
            .read()
            .expect("InMemoryTransferStore: events lock poisoned")
            .iter()
            .filter(|e| e.transfer_id == id)
            .cloned()
            .collect();
        events.reverse();
        Ok(events)
    }
}
