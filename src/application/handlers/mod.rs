//! Command and query handlers for the transfer lifecycle.

mod create_transfer;
mod get_transfer;
mod ingest_webhook;

pub use create_transfer::{CreateTransferCommand, CreateTransferHandler, CreateTransferOutcome};
pub use get_transfer::{GetTransferHandler, GetTransferQuery, TransferWithEvents};
pub use ingest_webhook::{IngestWebhookCommand, IngestWebhookHandler, IngestWebhookOutcome};
