//! Terminal status bookkeeping for processed events.

use tracing::info;

use ledgerflow_core::EventStatus;
use ledgerflow_events::RoutingError;

use crate::record_store::{RecordStore, RecordStoreError};

/// Maps a routing outcome onto the event's stored status.
#[derive(Debug, Clone)]
pub struct StatusTracker<S> {
    store: S,
}

impl<S: RecordStore> StatusTracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record the terminal status for a routed event.
    ///
    /// Success maps to COMPLETED, a routing failure to FAILED. Only the
    /// status field is written; the rest of the record is untouched.
    pub fn mark_terminal(
        &self,
        event_id: &str,
        outcome: &Result<(), RoutingError>,
    ) -> Result<(), RecordStoreError> {
        let status = match outcome {
            Ok(()) => EventStatus::Completed,
            Err(_) => EventStatus::Failed,
        };

        self.store.update_status(event_id, status)?;
        info!(event_id, status = %status, "event status updated");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ledgerflow_events::HandlerError;

    use crate::record_store::{InMemoryRecordStore, WorkflowEventRecord};

    use super::*;

    #[test]
    fn success_marks_completed() {
        let store = Arc::new(InMemoryRecordStore::new());
        store
            .put_record(&WorkflowEventRecord::received("e-1", "Deposit"))
            .unwrap();

        let tracker = StatusTracker::new(store.clone());
        tracker.mark_terminal("e-1", &Ok(())).unwrap();

        assert_eq!(store.scan_all().unwrap()[0].status, EventStatus::Completed);
    }

    #[test]
    fn routing_failure_marks_failed() {
        let store = Arc::new(InMemoryRecordStore::new());
        store
            .put_record(&WorkflowEventRecord::received("e-1", "Deposit"))
            .unwrap();

        let tracker = StatusTracker::new(store.clone());
        let outcome = Err(RoutingError::Handler {
            event_type: "Deposit".to_string(),
            source: HandlerError::new("ledger unavailable"),
        });
        tracker.mark_terminal("e-1", &outcome).unwrap();

        assert_eq!(store.scan_all().unwrap()[0].status, EventStatus::Failed);
    }

    #[test]
    fn unknown_event_id_surfaces_not_found() {
        let tracker = StatusTracker::new(Arc::new(InMemoryRecordStore::new()));

        let err = tracker.mark_terminal("ghost", &Ok(())).unwrap_err();
        assert!(matches!(err, RecordStoreError::NotFound(_)));
    }
}
