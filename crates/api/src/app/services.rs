//! Service wiring.
//!
//! One `AppServices` value per process, built once at startup for the
//! configured transport mode and shared with every handler. The in-memory
//! build backs tests and local development; the persistent build (Postgres
//! plus Redis) is behind the `redis` feature.

use std::sync::Arc;

use serde::Serialize;

use ledgerflow_core::{EventId, EventType};
use ledgerflow_events::{EventRouter, InMemoryTransport, NoopHandlers, WorkflowHandlers};
use ledgerflow_infra::consumer::{WorkerHandle, WorkflowConsumer};
use ledgerflow_infra::record_store::{
    InMemoryRecordStore, RecordStore, RecordStoreError, WorkflowEventRecord,
};
use ledgerflow_infra::status_tracker::StatusTracker;
use ledgerflow_infra::submitter::{EventSubmitter, SubmitError, TransportMode};

#[cfg(feature = "redis")]
use ledgerflow_infra::record_store::PostgresRecordStore;
#[cfg(feature = "redis")]
use ledgerflow_infra::transport::{RedisPubSubTransport, RedisStreamsTransport};

pub type InMemorySubmitter = EventSubmitter<Arc<InMemoryRecordStore>, Arc<InMemoryTransport>>;
#[cfg(feature = "redis")]
pub type QueueSubmitter = EventSubmitter<Arc<PostgresRecordStore>, RedisStreamsTransport>;
#[cfg(feature = "redis")]
pub type BusSubmitter = EventSubmitter<Arc<PostgresRecordStore>, RedisPubSubTransport>;

/// The services a request handler can reach, one variant per deployment.
pub enum AppServices {
    InMemory {
        submitter: InMemorySubmitter,
        store: Arc<InMemoryRecordStore>,
    },
    #[cfg(feature = "redis")]
    Queue {
        submitter: QueueSubmitter,
        store: Arc<PostgresRecordStore>,
    },
    #[cfg(feature = "redis")]
    Bus {
        submitter: BusSubmitter,
        store: Arc<PostgresRecordStore>,
    },
}

impl AppServices {
    pub fn submit<P: Serialize>(
        &self,
        event_type: EventType,
        payload: &P,
    ) -> Result<EventId, SubmitError> {
        match self {
            AppServices::InMemory { submitter, .. } => submitter.submit(event_type, payload),
            #[cfg(feature = "redis")]
            AppServices::Queue { submitter, .. } => submitter.submit(event_type, payload),
            #[cfg(feature = "redis")]
            AppServices::Bus { submitter, .. } => submitter.submit(event_type, payload),
        }
    }

    pub fn list_events(&self) -> Result<Vec<WorkflowEventRecord>, RecordStoreError> {
        match self {
            AppServices::InMemory { store, .. } => store.scan_all(),
            #[cfg(feature = "redis")]
            AppServices::Queue { store, .. } => store.scan_all(),
            #[cfg(feature = "redis")]
            AppServices::Bus { store, .. } => store.scan_all(),
        }
    }
}

/// Build the in-memory deployment: store, transport, and a consumer pool in
/// one process. Returned worker handles keep the consumers alive; dropping
/// them leaks the threads, so hold them for the process lifetime.
pub fn build_in_memory(
    mode: TransportMode,
    workers: usize,
) -> (Arc<AppServices>, Vec<WorkerHandle>) {
    let store = Arc::new(InMemoryRecordStore::new());
    let transport = Arc::new(InMemoryTransport::new());

    let handlers: Arc<dyn WorkflowHandlers> = Arc::new(NoopHandlers);
    let consumer = Arc::new(WorkflowConsumer::new(
        EventRouter::new(handlers),
        StatusTracker::new(store.clone()),
    ));
    let handles = consumer.spawn_pool("consumer", &transport, workers);

    let submitter = EventSubmitter::new(store.clone(), transport, mode);

    (
        Arc::new(AppServices::InMemory { submitter, store }),
        handles,
    )
}

/// Build the persistent deployment: Postgres record store plus a Redis
/// transport chosen by mode.
#[cfg(feature = "redis")]
pub async fn build_persistent(
    mode: TransportMode,
    database_url: &str,
    redis_url: &str,
    workers: usize,
) -> anyhow::Result<(Arc<AppServices>, Vec<WorkerHandle>)> {
    use sqlx::postgres::PgPoolOptions;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    let store = Arc::new(PostgresRecordStore::new(pool)?);
    store.ensure_schema().await?;

    let handlers: Arc<dyn WorkflowHandlers> = Arc::new(NoopHandlers);
    let consumer = Arc::new(WorkflowConsumer::new(
        EventRouter::new(handlers),
        StatusTracker::new(store.clone()),
    ));

    match mode {
        TransportMode::DirectQueue => {
            let transport = RedisStreamsTransport::new(redis_url, None, None)?;
            let handles = consumer.spawn_pool("consumer", &transport, workers);
            let submitter = EventSubmitter::new(store.clone(), transport, mode);
            Ok((Arc::new(AppServices::Queue { submitter, store }), handles))
        }
        TransportMode::EventBus => {
            let transport = RedisPubSubTransport::new(redis_url, "ledgerflow:events")?;
            let handles = consumer.spawn_pool("consumer", &transport, workers);
            let submitter = EventSubmitter::new(store.clone(), transport, mode);
            Ok((Arc::new(AppServices::Bus { submitter, store }), handles))
        }
    }
}
