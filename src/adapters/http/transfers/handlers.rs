//! HTTP handlers for the transfer endpoints.
//!
//! These handlers connect axum routes to the application layer command/query
//! handlers and map `TransferError` onto HTTP statuses.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::{
    CreateTransferCommand, CreateTransferHandler, CreateTransferOutcome, GetTransferHandler,
    GetTransferQuery, IngestWebhookCommand, IngestWebhookHandler,
};
use crate::domain::foundation::TransferId;
use crate::domain::transfer::TransferError;
use crate::ports::{PayoutProvider, TransferStore};

use super::dto::{
    CreatePayoutRequest, ErrorResponse, PayoutCreatedResponse, PayoutReplayResponse,
    TransferDetailResponse, TransferResponse, TransferSummaryResponse,
};

/// Shared application state, cloned per request. Dependencies are Arc-wrapped
/// trait objects so tests can swap in mocks.
#[derive(Clone)]
pub struct TransferAppState {
    pub store: Arc<dyn TransferStore>,
    pub provider: Arc<dyn PayoutProvider>,
    pub webhook_secret: String,
}

impl TransferAppState {
    pub fn create_transfer_handler(&self) -> CreateTransferHandler {
        CreateTransferHandler::new(self.store.clone(), self.provider.clone())
    }

    pub fn ingest_webhook_handler(&self) -> IngestWebhookHandler {
        IngestWebhookHandler::new(self.store.clone(), self.webhook_secret.clone())
    }

    pub fn get_transfer_handler(&self) -> GetTransferHandler {
        GetTransferHandler::new(self.store.clone())
    }
}

/// POST /api/payouts/interac - create and submit a payout.
///
/// 201 with `{success, transfer}` on creation, 200 with `{transfer}` on an
/// idempotent replay.
pub async fn create_payout(
    State(state): State<TransferAppState>,
    Json(request): Json<CreatePayoutRequest>,
) -> Result<impl IntoResponse, TransferApiError> {
    let handler = state.create_transfer_handler();
    let cmd = CreateTransferCommand {
        business_user_id: request.business_user_id,
        amount_cents: request.amount_cents,
        recipient_email: request.recipient_email,
        recipient_name: request.recipient_name,
        use_auto_deposit: request.use_auto_deposit,
        idempotency_key: request.idempotency_key,
    };

    let outcome = handler.handle(cmd).await?;

    let response = match outcome {
        CreateTransferOutcome::Created(transfer) => (
            StatusCode::CREATED,
            Json(PayoutCreatedResponse {
                success: true,
                transfer: TransferSummaryResponse::from(&transfer),
            }),
        )
            .into_response(),
        CreateTransferOutcome::AlreadyProcessed(transfer) => (
            StatusCode::OK,
            Json(PayoutReplayResponse {
                transfer: TransferResponse::from(&transfer),
            }),
        )
            .into_response(),
    };

    Ok(response)
}

/// POST /webhooks/interac - ingest a provider event.
///
/// Plain-text responses: 200 "OK" (processed or harmlessly ignored),
/// 400 "Invalid signature", 500 "Error".
pub async fn handle_provider_webhook(
    State(state): State<TransferAppState>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> axum::response::Response {
    let signature = headers
        .get("X-Webhook-Signature")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let handler = state.ingest_webhook_handler();
    let cmd = IngestWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    match handler.handle(cmd).await {
        Ok(_) => (StatusCode::OK, "OK").into_response(),
        Err(TransferError::InvalidSignature) => {
            (StatusCode::BAD_REQUEST, "Invalid signature").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Webhook processing failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error").into_response()
        }
    }
}

/// GET /api/transfers/:id - fetch a transfer and its event history.
pub async fn get_transfer(
    State(state): State<TransferAppState>,
    Path(id): Path<TransferId>,
) -> Result<impl IntoResponse, TransferApiError> {
    let handler = state.get_transfer_handler();
    let result = handler.handle(GetTransferQuery { id }).await?;
    Ok(Json(TransferDetailResponse::from(result)))
}

/// GET /health - liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// API error type that converts domain errors to HTTP responses.
pub struct TransferApiError(TransferError);

impl From<TransferError> for TransferApiError {
    fn from(err: TransferError) -> Self {
        Self(err)
    }
}

impl IntoResponse for TransferApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self.0 {
            TransferError::Validation { field, reason } => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::with_field(reason.clone(), field.clone()),
            ),
            TransferError::LimitExceeded { .. } => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(self.0.to_string()))
            }
            TransferError::InvalidSignature => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new("Invalid signature"))
            }
            TransferError::NotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorResponse::new("Transfer not found"))
            }
            TransferError::Provider(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_message("Provider error", message.clone()),
            ),
            TransferError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::with_message("Internal error", message.clone()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{BusinessUserId, Timestamp};
    use crate::domain::transfer::{Transfer, TransferEvent, TransferStatus};
    use crate::ports::{
        InsertOutcome, PayoutAcceptance, PayoutSubmission, ProviderError, StoreError,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MockTransferStore {
        transfers: Mutex<HashMap<TransferId, Transfer>>,
        events: Mutex<Vec<TransferEvent>>,
    }

    impl MockTransferStore {
        fn new() -> Self {
            Self {
                transfers: Mutex::new(HashMap::new()),
                events: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TransferStore for MockTransferStore {
        async fn find_by_idempotency_key(
            &self,
            idempotency_key: &str,
            business_user_id: &BusinessUserId,
        ) -> Result<Option<Transfer>, StoreError> {
            Ok(self
                .transfers
                .lock()
                .unwrap()
                .values()
                .find(|t| {
                    t.idempotency_key == idempotency_key
                        && &t.business_user_id == business_user_id
                })
                .cloned())
        }

        async fn insert(&self, transfer: &Transfer) -> Result<InsertOutcome, StoreError> {
            self.transfers
                .lock()
                .unwrap()
                .insert(transfer.id, transfer.clone());
            Ok(InsertOutcome::Inserted)
        }

        async fn record_submission(
            &self,
            id: TransferId,
            external_txn_id: &str,
            status: &TransferStatus,
            updated_at: Timestamp,
        ) -> Result<(), StoreError> {
            let mut transfers = self.transfers.lock().unwrap();
            let transfer = transfers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            transfer.external_txn_id = Some(external_txn_id.to_string());
            transfer.status = status.clone();
            transfer.updated_at = updated_at;
            Ok(())
        }

        async fn update_status(
            &self,
            id: TransferId,
            status: &TransferStatus,
            updated_at: Timestamp,
        ) -> Result<(), StoreError> {
            let mut transfers = self.transfers.lock().unwrap();
            let transfer = transfers.get_mut(&id).ok_or(StoreError::NotFound(id))?;
            transfer.status = status.clone();
            transfer.updated_at = updated_at;
            Ok(())
        }

        async fn append_event(&self, event: &TransferEvent) -> Result<(), StoreError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: TransferId) -> Result<Option<Transfer>, StoreError> {
            Ok(self.transfers.lock().unwrap().get(&id).cloned())
        }

        async fn events_for(&self, id: TransferId) -> Result<Vec<TransferEvent>, StoreError> {
            let mut events: Vec<_> = self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.transfer_id == id)
                .cloned()
                .collect();
            events.reverse();
            Ok(events)
        }
    }

    struct MockProvider;

    #[async_trait]
    impl PayoutProvider for MockProvider {
        async fn submit_payout(
            &self,
            _submission: PayoutSubmission,
        ) -> Result<PayoutAcceptance, ProviderError> {
            Ok(PayoutAcceptance {
                external_txn_id: "txn_mock".to_string(),
                status: Some("pending".to_string()),
            })
        }
    }

    fn test_state() -> TransferAppState {
        TransferAppState {
            store: Arc::new(MockTransferStore::new()),
            provider: Arc::new(MockProvider),
            webhook_secret: "whsec_test".to_string(),
        }
    }

    fn valid_request() -> CreatePayoutRequest {
        CreatePayoutRequest {
            business_user_id: Some("biz-1".to_string()),
            amount_cents: Some(5_000),
            recipient_email: Some("alice@example.com".to_string()),
            recipient_name: Some("Alice Example".to_string()),
            use_auto_deposit: None,
            idempotency_key: Some("k1".to_string()),
        }
    }

    #[tokio::test]
    async fn create_payout_returns_201_with_summary() {
        let state = test_state();
        let response = create_payout(State(state), Json(valid_request()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn replay_returns_200() {
        let state = test_state();
        create_payout(State(state.clone()), Json(valid_request()))
            .await
            .into_response();
        let response = create_payout(State(state), Json(valid_request()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_field_returns_400() {
        let state = test_state();
        let mut request = valid_request();
        request.recipient_email = None;
        let response = create_payout(State(state), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn over_ceiling_returns_400() {
        let state = test_state();
        let mut request = valid_request();
        request.amount_cents = Some(2_500_001);
        let response = create_payout(State(state), Json(request))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_returns_400_text() {
        let state = test_state();
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("X-Webhook-Signature", "deadbeef".parse().unwrap());
        let response = handle_provider_webhook(
            State(state),
            headers,
            axum::body::Bytes::from_static(b"{}"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_without_signature_returns_400() {
        let state = test_state();
        let response = handle_provider_webhook(
            State(state),
            axum::http::HeaderMap::new(),
            axum::body::Bytes::from_static(b"{}"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_unknown_transfer_returns_404() {
        let state = test_state();
        let response = get_transfer(State(state), Path(TransferId::new()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
