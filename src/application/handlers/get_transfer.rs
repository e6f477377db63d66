//! GetTransferHandler - read path for a transfer and its event history.

use std::sync::Arc;

use crate::domain::foundation::TransferId;
use crate::domain::transfer::{Transfer, TransferError, TransferEvent};
use crate::ports::TransferStore;

/// Query for one transfer by id.
#[derive(Debug, Clone, Copy)]
pub struct GetTransferQuery {
    pub id: TransferId,
}

/// A transfer together with its event history, newest first.
#[derive(Debug, Clone)]
pub struct TransferWithEvents {
    pub transfer: Transfer,
    pub events: Vec<TransferEvent>,
}

/// Handler for the transfer read path.
pub struct GetTransferHandler {
    store: Arc<dyn TransferStore>,
}

impl GetTransferHandler {
    pub fn new(store: Arc<dyn TransferStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, query: GetTransferQuery) -> Result<TransferWithEvents, TransferError> {
        let transfer = self
            .store
            .find_by_id(query.id)
            .await?
            .ok_or(TransferError::NotFound(query.id))?;
        let events = self.store.events_for(query.id).await?;
        Ok(TransferWithEvents { transfer, events })
    }
}
