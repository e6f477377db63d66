//! PostgreSQL implementation of the TransferStore port.
//!
//! Two tables: `transfers` (one row per logical transfer, unique on
//! `idempotency_key`) and `transfer_events` (append-only, foreign-keyed to
//! `transfers`). The unique constraint is what closes the concurrent-create
//! race: the losing insert trips it and the caller is handed the winner's row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{BusinessUserId, Timestamp, TransferId};
use crate::domain::transfer::{Transfer, TransferEvent, TransferStatus};
use crate::ports::{InsertOutcome, StoreError, TransferStore};

const IDEMPOTENCY_KEY_CONSTRAINT: &str = "transfers_idempotency_key_key";

/// PostgreSQL implementation of the TransferStore port.
pub struct PostgresTransferStore {
    pool: PgPool,
}

impl PostgresTransferStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a transfer.
#[derive(Debug, sqlx::FromRow)]
struct TransferRow {
    id: Uuid,
    idempotency_key: String,
    business_user_id: String,
    recipient_email: String,
    recipient_name: String,
    amount_cents: i64,
    currency: String,
    use_auto_deposit: bool,
    external_txn_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TransferRow> for Transfer {
    type Error = StoreError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        let business_user_id = BusinessUserId::new(&row.business_user_id).ok_or_else(|| {
            StoreError::Database(format!(
                "Invalid business_user_id in row {}: {:?}",
                row.id, row.business_user_id
            ))
        })?;

        Ok(Transfer {
            id: TransferId::from_uuid(row.id),
            idempotency_key: row.idempotency_key,
            business_user_id,
            recipient_email: row.recipient_email,
            recipient_name: row.recipient_name,
            amount_cents: row.amount_cents,
            currency: row.currency,
            use_auto_deposit: row.use_auto_deposit,
            external_txn_id: row.external_txn_id,
            status: TransferStatus::parse(&row.status),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Database row representation of a transfer event.
#[derive(Debug, sqlx::FromRow)]
struct TransferEventRow {
    transfer_id: Uuid,
    event_type: String,
    event_payload: serde_json::Value,
    received_at: DateTime<Utc>,
}

impl From<TransferEventRow> for TransferEvent {
    fn from(row: TransferEventRow) -> Self {
        TransferEvent {
            transfer_id: TransferId::from_uuid(row.transfer_id),
            event_type: row.event_type,
            event_payload: row.event_payload,
            received_at: Timestamp::from_datetime(row.received_at),
        }
    }
}

const SELECT_TRANSFER: &str = r#"
    SELECT id, idempotency_key, business_user_id, recipient_email, recipient_name,
           amount_cents, currency, use_auto_deposit, external_txn_id, status,
           created_at, updated_at
    FROM transfers
"#;

#[async_trait]
impl TransferStore for PostgresTransferStore {
    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
        business_user_id: &BusinessUserId,
    ) -> Result<Option<Transfer>, StoreError> {
        let row: Option<TransferRow> = sqlx::query_as(&format!(
            "{SELECT_TRANSFER} WHERE idempotency_key = $1 AND business_user_id = $2"
        ))
        .bind(idempotency_key)
        .bind(business_user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to find transfer: {}", e)))?;

        row.map(Transfer::try_from).transpose()
    }

    async fn insert(&self, transfer: &Transfer) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO transfers (
                id, idempotency_key, business_user_id, recipient_email, recipient_name,
                amount_cents, currency, use_auto_deposit, external_txn_id, status,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(transfer.id.as_uuid())
        .bind(&transfer.idempotency_key)
        .bind(transfer.business_user_id.as_str())
        .bind(&transfer.recipient_email)
        .bind(&transfer.recipient_name)
        .bind(transfer.amount_cents)
        .bind(&transfer.currency)
        .bind(transfer.use_auto_deposit)
        .bind(&transfer.external_txn_id)
        .bind(transfer.status.as_str())
        .bind(transfer.created_at.as_datetime())
        .bind(transfer.updated_at.as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) => {
                let unique_violation = matches!(
                    &e,
                    sqlx::Error::Database(db_err)
                        if db_err.constraint() == Some(IDEMPOTENCY_KEY_CONSTRAINT)
                );
                if !unique_violation {
                    return Err(StoreError::Database(format!(
                        "Failed to insert transfer: {}",
                        e
                    )));
                }

                // Lost the race: hand back the winner's row.
                self.find_by_idempotency_key(
                    &transfer.idempotency_key,
                    &transfer.business_user_id,
                )
                .await?
                .map(InsertOutcome::DuplicateKey)
                .ok_or_else(|| {
                    StoreError::Database(format!(
                        "Idempotency key {:?} taken by another business user",
                        transfer.idempotency_key
                    ))
                })
            }
        }
    }

    async fn record_submission(
        &self,
        id: TransferId,
        external_txn_id: &str,
        status: &TransferStatus,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE transfers
            SET external_txn_id = $2, status = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(external_txn_id)
        .bind(status.as_str())
        .bind(updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to record submission: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn update_status(
        &self,
        id: TransferId,
        status: &TransferStatus,
        updated_at: Timestamp,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE transfers
            SET status = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .bind(updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to update status: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn append_event(&self, event: &TransferEvent) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO transfer_events (transfer_id, event_type, event_payload, received_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(event.transfer_id.as_uuid())
        .bind(&event.event_type)
        .bind(&event.event_payload)
        .bind(event.received_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to append event: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: TransferId) -> Result<Option<Transfer>, StoreError> {
        let row: Option<TransferRow> =
            sqlx::query_as(&format!("{SELECT_TRANSFER} WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Database(format!("Failed to find transfer: {}", e)))?;

        row.map(Transfer::try_from).transpose()
    }

    async fn events_for(&self, id: TransferId) -> Result<Vec<TransferEvent>, StoreError> {
        let rows: Vec<TransferEventRow> = sqlx::query_as(
            r#"
            SELECT transfer_id, event_type, event_payload, received_at
            FROM transfer_events
            WHERE transfer_id = $1
            ORDER BY received_at DESC
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(format!("Failed to load events: {}", e)))?;

        Ok(rows.into_iter().map(TransferEvent::from).collect())
    }
}
