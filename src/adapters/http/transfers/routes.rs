//! Axum router configuration for the transfer endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_payout, get_transfer, handle_provider_webhook, health, TransferAppState,
};

/// Payout and query routes, mounted under `/api`.
///
/// - `POST /payouts/interac` - create and submit a transfer
/// - `GET /transfers/:id` - fetch a transfer with its event history
pub fn payout_routes() -> Router<TransferAppState> {
    Router::new()
        .route("/payouts/interac", post(create_payout))
        .route("/transfers/:id", get(get_transfer))
}

/// Webhook routes, mounted under `/webhooks`. Separate from the API routes
/// because webhooks carry no client auth; they are verified via signature.
///
/// - `POST /interac` - provider status events
pub fn webhook_routes() -> Router<TransferAppState> {
    Router::new().route("/interac", post(handle_provider_webhook))
}

/// The complete application router.
pub fn api_router() -> Router<TransferAppState> {
    Router::new()
        .nest("/api", payout_routes())
        .nest("/webhooks", webhook_routes())
        .route("/health", get(health))
}
