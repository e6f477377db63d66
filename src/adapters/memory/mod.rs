//! In-memory adapters for testing and local runs.

mod transfer_store;

pub use transfer_store::InMemoryTransferStore;
