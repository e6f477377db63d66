//! HTTP surface for the transfer lifecycle.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::TransferAppState;
pub use routes::api_router;
