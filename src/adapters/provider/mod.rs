//! Outbound provider adapters.

mod interac_client;

pub use interac_client::{InteracClient, InteracConfig};
