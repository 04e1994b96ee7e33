//! Event submission.
//!
//! `EventSubmitter` is the single write path into the pipeline: persist a
//! RECEIVED record, then dispatch over the configured transport. The persist
//! strictly precedes the dispatch, so a consumer can never observe a message
//! whose record does not exist yet.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{error, info};

use ledgerflow_core::{EventId, EventType};
use ledgerflow_events::{BusEntry, Transport, TransportMessage, WorkflowEvent};

use crate::record_store::{RecordStore, RecordStoreError, WorkflowEventRecord};

/// How submitted events travel to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Point-to-point queue. The full `WorkflowEvent` envelope is the body;
    /// `eventId` and `type` ride along as message attributes.
    DirectQueue,
    /// Broadcast bus. The body is a `BusEntry` wrapping the bare payload.
    EventBus,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::DirectQueue => "direct-queue",
            TransportMode::EventBus => "event-bus",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct-queue" => Ok(TransportMode::DirectQueue),
            "event-bus" => Ok(TransportMode::EventBus),
            other => Err(format!("unknown transport mode: {other}")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("failed to persist event record: {0}")]
    Persistence(#[from] RecordStoreError),

    #[error("failed to serialize event payload: {0}")]
    Serialization(String),

    #[error("failed to dispatch event: {0}")]
    Dispatch(String),
}

/// Persists then dispatches business events.
#[derive(Debug, Clone)]
pub struct EventSubmitter<S, T> {
    store: S,
    transport: T,
    mode: TransportMode,
}

impl<S, T> EventSubmitter<S, T>
where
    S: RecordStore,
    T: Transport,
{
    pub fn new(store: S, transport: T, mode: TransportMode) -> Self {
        Self {
            store,
            transport,
            mode,
        }
    }

    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    /// Submit a business event.
    ///
    /// Assigns a fresh event id, writes a RECEIVED record, and dispatches the
    /// payload in the shape the configured mode expects. A persistence
    /// failure aborts before anything reaches the transport.
    pub fn submit<P: Serialize>(
        &self,
        event_type: EventType,
        payload: &P,
    ) -> Result<EventId, SubmitError> {
        let event_id = EventId::new();

        info!(
            event_id = %event_id,
            event_type = %event_type,
            mode = %self.mode,
            "submitting event"
        );

        self.store.put_record(&WorkflowEventRecord::received(
            event_id.to_string(),
            event_type.as_str(),
        ))?;

        let detail = serde_json::to_value(payload)
            .map_err(|e| SubmitError::Serialization(e.to_string()))?;

        let message = match self.mode {
            TransportMode::DirectQueue => {
                let event =
                    WorkflowEvent::new(event_id.to_string(), event_type.as_str(), detail);
                let body = serde_json::to_string(&event)
                    .map_err(|e| SubmitError::Serialization(e.to_string()))?;
                TransportMessage::new(body)
                    .with_attribute("eventId", event_id.to_string())
                    .with_attribute("type", event_type.as_str())
            }
            TransportMode::EventBus => {
                let entry = BusEntry::new(event_type.as_str(), detail);
                let body = serde_json::to_string(&entry)
                    .map_err(|e| SubmitError::Serialization(e.to_string()))?;
                TransportMessage::new(body)
            }
        };

        self.transport.send(message).map_err(|e| {
            error!(event_id = %event_id, error = ?e, "event dispatch failed");
            SubmitError::Dispatch(format!("{e:?}"))
        })?;

        Ok(event_id)
    }
}
