//! Postgres-backed record store.
//!
//! The `RecordStore` trait is synchronous; sqlx is async. The runtime handle
//! is captured at construction and the sync trait methods block in-place.
//! That is legal from consumer worker threads and from `spawn_blocking`
//! contexts (the API layer submits through the latter), but calling the sync
//! trait directly from an async task panics; use the `*_async` methods
//! there instead.

use std::sync::Arc;

use sqlx::{PgPool, Row};
use tracing::instrument;

use ledgerflow_core::EventStatus;

use super::r#trait::{RecordStore, RecordStoreError, WorkflowEventRecord};

/// Postgres-backed store, table `workflow_events(event_id, type, status)`.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: Arc<PgPool>,
    handle: tokio::runtime::Handle,
}

impl PostgresRecordStore {
    /// Create a store over an existing pool.
    ///
    /// Must be called from within a tokio runtime; the current handle is
    /// captured for bridging the sync trait methods.
    pub fn new(pool: PgPool) -> Result<Self, RecordStoreError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            RecordStoreError::Storage("PostgresRecordStore requires a tokio runtime".to_string())
        })?;

        Ok(Self {
            pool: Arc::new(pool),
            handle,
        })
    }

    /// Create the backing table if it does not exist (idempotent).
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> Result<(), RecordStoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflow_events (
                event_id TEXT PRIMARY KEY,
                "type" TEXT NOT NULL,
                status TEXT NOT NULL
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        Ok(())
    }

    #[instrument(skip(self, record), fields(event_id = %record.event_id), err)]
    pub async fn put_record_async(
        &self,
        record: &WorkflowEventRecord,
    ) -> Result<(), RecordStoreError> {
        sqlx::query(
            r#"
            INSERT INTO workflow_events (event_id, "type", status)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id)
            DO UPDATE SET "type" = EXCLUDED."type", status = EXCLUDED.status
            "#,
        )
        .bind(&record.event_id)
        .bind(&record.detail_type)
        .bind(record.status.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("put_record", e))?;

        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn update_status_async(
        &self,
        event_id: &str,
        status: EventStatus,
    ) -> Result<(), RecordStoreError> {
        // Field-scoped: only the status column moves.
        let result = sqlx::query("UPDATE workflow_events SET status = $2 WHERE event_id = $1")
            .bind(event_id)
            .bind(status.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_status", e))?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::NotFound(event_id.to_string()));
        }

        Ok(())
    }

    pub async fn scan_all_async(&self) -> Result<Vec<WorkflowEventRecord>, RecordStoreError> {
        let rows = sqlx::query(r#"SELECT event_id, "type", status FROM workflow_events"#)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("scan_all", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let event_id: String = row
                .try_get("event_id")
                .map_err(|e| RecordStoreError::Storage(format!("failed to read event_id: {e}")))?;
            let detail_type: String = row
                .try_get("type")
                .map_err(|e| RecordStoreError::Storage(format!("failed to read type: {e}")))?;
            let status_raw: String = row
                .try_get("status")
                .map_err(|e| RecordStoreError::Storage(format!("failed to read status: {e}")))?;

            let status = status_raw
                .parse::<EventStatus>()
                .map_err(|e| RecordStoreError::Storage(e.to_string()))?;

            records.push(WorkflowEventRecord {
                event_id,
                detail_type,
                status,
            });
        }

        Ok(records)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RecordStoreError {
    match err {
        sqlx::Error::Database(db) => RecordStoreError::Storage(format!(
            "database error in {operation}: {}",
            db.message()
        )),
        sqlx::Error::PoolClosed => {
            RecordStoreError::Storage(format!("connection pool closed in {operation}"))
        }
        other => RecordStoreError::Storage(format!("sqlx error in {operation}: {other}")),
    }
}

impl RecordStore for PostgresRecordStore {
    fn put_record(&self, record: &WorkflowEventRecord) -> Result<(), RecordStoreError> {
        self.handle.block_on(self.put_record_async(record))
    }

    fn update_status(&self, event_id: &str, status: EventStatus) -> Result<(), RecordStoreError> {
        self.handle.block_on(self.update_status_async(event_id, status))
    }

    fn scan_all(&self) -> Result<Vec<WorkflowEventRecord>, RecordStoreError> {
        self.handle.block_on(self.scan_all_async())
    }
}
