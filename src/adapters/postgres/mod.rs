//! PostgreSQL adapters.

mod transfer_store;

pub use transfer_store::PostgresTransferStore;
