use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerflow_core::EventStatus;

/// Persisted receipt of a workflow event.
///
/// Three string-valued fields; `detail_type` travels under the name `type`
/// (wire and column name alike). A record is created RECEIVED at submission,
/// mutated once to a terminal status by the consumer, and never deleted. A
/// record stuck in RECEIVED is the observable signal for a lost dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEventRecord {
    pub event_id: String,
    #[serde(rename = "type")]
    pub detail_type: String,
    pub status: EventStatus,
}

impl WorkflowEventRecord {
    /// A fresh receipt in the initial state.
    pub fn received(event_id: impl Into<String>, detail_type: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            detail_type: detail_type.into(),
            status: EventStatus::Received,
        }
    }
}

/// Record store operation error.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    /// The backend failed (connection, query, lock poisoning).
    #[error("storage failure: {0}")]
    Storage(String),

    /// A status update targeted an event id with no record. Records are
    /// always written before dispatch, so this indicates a lost write or a
    /// foreign message; it is surfaced rather than upserted to keep the
    /// nothing-skips-RECEIVED invariant intact.
    #[error("no record for event {0}")]
    NotFound(String),
}

/// Store for workflow event receipts.
///
/// Implementations must make `put_record` durable before returning; the
/// submitter relies on persistence happening before dispatch. `update_status`
/// touches only the status field of an existing record, never the rest.
pub trait RecordStore: Send + Sync {
    fn put_record(&self, record: &WorkflowEventRecord) -> Result<(), RecordStoreError>;

    fn update_status(&self, event_id: &str, status: EventStatus) -> Result<(), RecordStoreError>;

    /// Full unordered scan. The read API is a debugging/operations surface;
    /// no pagination is offered.
    fn scan_all(&self) -> Result<Vec<WorkflowEventRecord>, RecordStoreError>;
}

impl<S> RecordStore for Arc<S>
where
    S: RecordStore + ?Sized,
{
    fn put_record(&self, record: &WorkflowEventRecord) -> Result<(), RecordStoreError> {
        (**self).put_record(record)
    }

    fn update_status(&self, event_id: &str, status: EventStatus) -> Result<(), RecordStoreError> {
        (**self).update_status(event_id, status)
    }

    fn scan_all(&self) -> Result<Vec<WorkflowEventRecord>, RecordStoreError> {
        (**self).scan_all()
    }
}
