//! End-to-end transfer lifecycle tests.
//!
//! Drives the application handlers directly with the in-memory store and a
//! mock provider: create, idempotent replay, webhook-driven status
//! progression and the query path.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use payout_gateway::adapters::memory::InMemoryTransferStore;
use payout_gateway::application::handlers::{
    CreateTransferCommand, CreateTransferHandler, CreateTransferOutcome, GetTransferHandler,
    GetTransferQuery, IngestWebhookCommand, IngestWebhookHandler, IngestWebhookOutcome,
};
use payout_gateway::domain::foundation::TransferId;
use payout_gateway::domain::transfer::{TransferError, TransferStatus};
use payout_gateway::ports::{PayoutAcceptance, PayoutProvider, PayoutSubmission, ProviderError};

const WEBHOOK_SECRET: &str = "whsec_integration";

struct CountingProvider {
    calls: AtomicU32,
    reported_status: Option<&'static str>,
}

impl CountingProvider {
    fn new(reported_status: Option<&'static str>) -> Self {
        Self {
            calls: AtomicU32::new(0),
            reported_status,
        }
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PayoutProvider for CountingProvider {
    async fn submit_payout(
        &self,
        submission: PayoutSubmission,
    ) -> Result<PayoutAcceptance, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PayoutAcceptance {
            external_txn_id: format!("txn_{}", submission.idempotency_key),
            status: self.reported_status.map(str::to_string),
        })
    }
}

fn sign(payload: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes())
        .expect("HMAC accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn create_command(key: &str, amount_cents: i64) -> CreateTransferCommand {
    CreateTransferCommand {
        business_user_id: Some("biz-1".to_string()),
        amount_cents: Some(amount_cents),
        recipient_email: Some("alice@example.com".to_string()),
        recipient_name: Some("Alice Example".to_string()),
        use_auto_deposit: None,
        idempotency_key: Some(key.to_string()),
    }
}

fn webhook_body(transfer_id: TransferId, txn_id: &str, status: &str) -> Vec<u8> {
    format!(
        r#"{{"type":"transfer.{status}","data":{{"id":"{txn_id}","status":"{status}","metadata":{{"localTransferId":"{transfer_id}"}}}}}}"#
    )
    .into_bytes()
}

#[tokio::test]
async fn full_lifecycle_create_replay_and_webhook_progression() {
    let store = Arc::new(InMemoryTransferStore::new());
    let provider = Arc::new(CountingProvider::new(Some("pending")));
    let create = CreateTransferHandler::new(store.clone(), provider.clone());
    let ingest = IngestWebhookHandler::new(store.clone(), WEBHOOK_SECRET);
    let query = GetTransferHandler::new(store.clone());

    // Create.
    let outcome = create.handle(create_command("k1", 5_000)).await.unwrap();
    let transfer = match &outcome {
        CreateTransferOutcome::Created(t) => t.clone(),
        CreateTransferOutcome::AlreadyProcessed(_) => panic!("expected fresh creation"),
    };
    assert_eq!(transfer.status, TransferStatus::Pending);
    assert_eq!(transfer.external_txn_id.as_deref(), Some("txn_k1"));
    assert_eq!(provider.call_count(), 1);

    // Replay: same record, no extra provider call.
    let replay = create.handle(create_command("k1", 5_000)).await.unwrap();
    match replay {
        CreateTransferOutcome::AlreadyProcessed(t) => assert_eq!(t.id, transfer.id),
        CreateTransferOutcome::Created(_) => panic!("expected replay"),
    }
    assert_eq!(provider.call_count(), 1);
    assert_eq!(store.transfer_count(), 1);

    // Webhook: sent.
    let body = webhook_body(transfer.id, "txn_k1", "sent");
    let signature = sign(&body);
    let outcome = ingest
        .handle(IngestWebhookCommand {
            payload: body,
            signature: Some(signature),
        })
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        IngestWebhookOutcome::Applied {
            status: TransferStatus::Sent,
            ..
        }
    ));

    // Webhook: deposited.
    let body = webhook_body(transfer.id, "txn_k1", "deposited");
    let signature = sign(&body);
    ingest
        .handle(IngestWebhookCommand {
            payload: body,
            signature: Some(signature),
        })
        .await
        .unwrap();

    // Query: final status plus both events, newest first.
    let result = query
        .handle(GetTransferQuery { id: transfer.id })
        .await
        .unwrap();
    assert_eq!(result.transfer.status, TransferStatus::Deposited);
    assert_eq!(result.events.len(), 2);
    assert_eq!(result.events[0].event_type, "transfer.deposited");
    assert_eq!(result.events[1].event_type, "transfer.sent");
}

#[tokio::test]
async fn distinct_keys_create_distinct_transfers() {
    let store = Arc::new(InMemoryTransferStore::new());
    let provider = Arc::new(CountingProvider::new(None));
    let create = CreateTransferHandler::new(store.clone(), provider.clone());

    let first = create.handle(create_command("k1", 1_000)).await.unwrap();
    let second = create.handle(create_command("k2", 2_000)).await.unwrap();

    assert_ne!(first.transfer().id, second.transfer().id);
    assert_eq!(store.transfer_count(), 2);
    assert_eq!(provider.call_count(), 2);
    // No reported status from the provider falls back to submitted.
    assert_eq!(first.transfer().status, TransferStatus::Submitted);
}

#[tokio::test]
async fn amount_bounds_are_enforced() {
    let store = Arc::new(InMemoryTransferStore::new());
    let provider = Arc::new(CountingProvider::new(None));
    let create = CreateTransferHandler::new(store.clone(), provider.clone());

    assert!(create
        .handle(create_command("k-max", 2_500_000))
        .await
        .is_ok());

    let over = create.handle(create_command("k-over", 2_500_001)).await;
    assert!(matches!(over, Err(TransferError::LimitExceeded { .. })));

    let zero = create.handle(create_command("k-zero", 0)).await;
    assert!(matches!(zero, Err(TransferError::Validation { .. })));

    assert_eq!(store.transfer_count(), 1);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn unmatched_webhook_leaves_store_untouched() {
    let store = Arc::new(InMemoryTransferStore::new());
    let ingest = IngestWebhookHandler::new(store.clone(), WEBHOOK_SECRET);

    let body = webhook_body(TransferId::new(), "txn_ghost", "sent");
    let signature = sign(&body);

    let outcome = ingest
        .handle(IngestWebhookCommand {
            payload: body,
            signature: Some(signature),
        })
        .await
        .unwrap();

    assert_eq!(outcome, IngestWebhookOutcome::Ignored);
    assert_eq!(store.event_count(), 0);
    assert_eq!(store.transfer_count(), 0);
}

#[tokio::test]
async fn tampered_webhook_is_rejected_end_to_end() {
    let store = Arc::new(InMemoryTransferStore::new());
    let provider = Arc::new(CountingProvider::new(None));
    let create = CreateTransferHandler::new(store.clone(), provider);
    let ingest = IngestWebhookHandler::new(store.clone(), WEBHOOK_SECRET);

    let outcome = create.handle(create_command("k1", 5_000)).await.unwrap();
    let transfer_id = outcome.transfer().id;

    let body = webhook_body(transfer_id, "txn_k1", "deposited");
    let signature = sign(&body);
    let mut tampered = body.clone();
    let last = tampered.len() - 1;
    tampered[last] = b' ';

    let result = ingest
        .handle(IngestWebhookCommand {
            payload: tampered,
            signature: Some(signature),
        })
        .await;

    assert!(matches!(result, Err(TransferError::InvalidSignature)));
    assert_eq!(store.event_count(), 0);
}
