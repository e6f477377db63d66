//! Ports - interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! domain and the outside world. Adapters implement these ports.

mod payout_provider;
mod transfer_store;

pub use payout_provider::{PayoutAcceptance, PayoutProvider, PayoutSubmission, ProviderError};
pub use transfer_store::{InsertOutcome, StoreError, TransferStore};
