//! End-to-end pipeline tests over the in-memory store and transport.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;

use ledgerflow_core::{EventStatus, EventType};
use ledgerflow_events::{
    BusEntry, EventRouter, HandlerError, InMemoryTransport, NoopHandlers, Transport,
    TransportMessage, WorkflowEvent, WorkflowHandlers,
};

use crate::consumer::WorkflowConsumer;
use crate::record_store::{InMemoryRecordStore, RecordStore, WorkflowEventRecord};
use crate::status_tracker::StatusTracker;
use crate::submitter::{EventSubmitter, TransportMode};

struct FailingDepositHandlers;

impl WorkflowHandlers for FailingDepositHandlers {
    fn on_register_customer(&self, _: &WorkflowEvent) -> Result<(), HandlerError> {
        Ok(())
    }

    fn on_open_account(&self, _: &WorkflowEvent) -> Result<(), HandlerError> {
        Ok(())
    }

    fn on_deposit(&self, _: &WorkflowEvent) -> Result<(), HandlerError> {
        Err(HandlerError::new("ledger write rejected"))
    }

    fn on_payout(&self, _: &WorkflowEvent) -> Result<(), HandlerError> {
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DepositPayload {
    user_id: String,
    account_id: String,
    currency: String,
    amount: f64,
}

fn deposit_payload() -> DepositPayload {
    DepositPayload {
        user_id: "u-1".to_string(),
        account_id: "acc-1".to_string(),
        currency: "EUR".to_string(),
        amount: 125.50,
    }
}

type Pipeline = (
    Arc<InMemoryRecordStore>,
    Arc<InMemoryTransport>,
    EventSubmitter<Arc<InMemoryRecordStore>, Arc<InMemoryTransport>>,
    Arc<WorkflowConsumer<Arc<InMemoryRecordStore>>>,
);

fn pipeline(mode: TransportMode, handlers: Arc<dyn WorkflowHandlers>) -> Pipeline {
    let store = Arc::new(InMemoryRecordStore::new());
    let transport = Arc::new(InMemoryTransport::new());

    let submitter = EventSubmitter::new(store.clone(), transport.clone(), mode);
    let consumer = Arc::new(WorkflowConsumer::new(
        EventRouter::new(handlers),
        StatusTracker::new(store.clone()),
    ));

    (store, transport, submitter, consumer)
}

fn wait_for_status(
    store: &InMemoryRecordStore,
    event_id: &str,
    expected: EventStatus,
) -> bool {
    for _ in 0..100 {
        let records = store.scan_all().unwrap();
        if records
            .iter()
            .any(|r| r.event_id == event_id && r.status == expected)
        {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn submitted_deposit_reaches_completed() {
    let (store, transport, submitter, consumer) =
        pipeline(TransportMode::DirectQueue, Arc::new(NoopHandlers));
    let worker = consumer.spawn("worker-0".to_string(), &transport);

    let event_id = submitter
        .submit(EventType::Deposit, &deposit_payload())
        .unwrap();

    assert!(wait_for_status(
        &store,
        &event_id.to_string(),
        EventStatus::Completed
    ));
    worker.shutdown();
}

#[test]
fn failing_handler_marks_the_event_failed() {
    let (store, transport, submitter, consumer) =
        pipeline(TransportMode::DirectQueue, Arc::new(FailingDepositHandlers));
    let worker = consumer.spawn("worker-0".to_string(), &transport);

    let event_id = submitter
        .submit(EventType::Deposit, &deposit_payload())
        .unwrap();

    assert!(wait_for_status(
        &store,
        &event_id.to_string(),
        EventStatus::Failed
    ));
    worker.shutdown();
}

#[test]
fn bus_mode_payload_without_embedded_ids_stays_received() {
    let (store, transport, submitter, consumer) =
        pipeline(TransportMode::EventBus, Arc::new(NoopHandlers));
    let worker = consumer.spawn("worker-0".to_string(), &transport);

    let event_id = submitter
        .submit(EventType::Payout, &deposit_payload())
        .unwrap();

    // The bus entry carries the bare payload. Without an embedded eventId the
    // consumer cannot recover the join key, so the record keeps its
    // submission status.
    assert!(!wait_for_status(
        &store,
        &event_id.to_string(),
        EventStatus::Completed
    ));
    let records = store.scan_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, EventStatus::Received);
    worker.shutdown();
}

#[test]
fn bus_entry_with_embedded_event_completes() {
    let (store, transport, _submitter, consumer) =
        pipeline(TransportMode::EventBus, Arc::new(NoopHandlers));
    let worker = consumer.spawn("worker-0".to_string(), &transport);

    store
        .put_record(&WorkflowEventRecord::received("e-77", "Payout"))
        .unwrap();

    let event = WorkflowEvent::new("e-77", "Payout", json!({ "amount": 5.0 }));
    let entry = BusEntry::new("Payout", serde_json::to_value(&event).unwrap());
    transport
        .send(TransportMessage::new(serde_json::to_string(&entry).unwrap()))
        .unwrap();

    assert!(wait_for_status(&store, "e-77", EventStatus::Completed));
    worker.shutdown();
}

#[test]
fn worker_pool_processes_every_submission() {
    let (store, transport, submitter, consumer) =
        pipeline(TransportMode::DirectQueue, Arc::new(NoopHandlers));
    // The in-memory transport broadcasts to every subscription; one worker
    // keeps delivery counts deterministic here.
    let workers = consumer.spawn_pool("worker", &transport, 1);

    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(
            submitter
                .submit(EventType::OpenAccount, &deposit_payload())
                .unwrap(),
        );
    }

    for id in &ids {
        assert!(wait_for_status(
            &store,
            &id.to_string(),
            EventStatus::Completed
        ));
    }

    for worker in workers {
        worker.shutdown();
    }
}

#[test]
fn redelivery_of_a_terminal_event_stays_terminal() {
    let (store, _transport, _submitter, consumer) =
        pipeline(TransportMode::DirectQueue, Arc::new(NoopHandlers));

    store
        .put_record(&WorkflowEventRecord::received("e-1", "Deposit"))
        .unwrap();

    let body =
        serde_json::to_string(&WorkflowEvent::new("e-1", "Deposit", json!({"amount": 1.0})))
            .unwrap();

    consumer.process(&body).unwrap();
    consumer.process(&body).unwrap();

    let records = store.scan_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, EventStatus::Completed);
}

#[test]
fn garbage_on_the_bus_leaves_records_received() {
    let (store, _transport, submitter, consumer) =
        pipeline(TransportMode::DirectQueue, Arc::new(NoopHandlers));

    let event_id = submitter
        .submit(EventType::Deposit, &deposit_payload())
        .unwrap();

    assert!(consumer.process("{\"unrelated\": true}").is_err());

    let records = store.scan_all().unwrap();
    let record = records
        .iter()
        .find(|r| r.event_id == event_id.to_string())
        .unwrap();
    assert_eq!(record.status, EventStatus::Received);
}
