//! Transfer aggregate, status state machine, and error taxonomy.

mod errors;
mod status;
#[allow(clippy::module_inception)]
mod transfer;

pub use errors::TransferError;
pub use status::{apply_provider_status, TransferStatus};
pub use transfer::{NewTransfer, Transfer, TransferEvent, AMOUNT_CEILING_CENTS, CURRENCY};
