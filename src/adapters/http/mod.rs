//! HTTP adapter - axum routes, handlers and DTOs.

pub mod transfers;

pub use transfers::{api_router, TransferAppState};
