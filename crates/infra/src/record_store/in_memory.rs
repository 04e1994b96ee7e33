use std::collections::HashMap;
use std::sync::RwLock;

use ledgerflow_core::EventStatus;

use super::r#trait::{RecordStore, RecordStoreError, WorkflowEventRecord};

/// In-memory record store.
///
/// Intended for tests/dev. Last write wins on duplicate event ids.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, WorkflowEventRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn put_record(&self, record: &WorkflowEventRecord) -> Result<(), RecordStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RecordStoreError::Storage("lock poisoned".to_string()))?;

        records.insert(record.event_id.clone(), record.clone());
        Ok(())
    }

    fn update_status(&self, event_id: &str, status: EventStatus) -> Result<(), RecordStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RecordStoreError::Storage("lock poisoned".to_string()))?;

        match records.get_mut(event_id) {
            Some(record) => {
                record.status = status;
                Ok(())
            }
            None => Err(RecordStoreError::NotFound(event_id.to_string())),
        }
    }

    fn scan_all(&self) -> Result<Vec<WorkflowEventRecord>, RecordStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| RecordStoreError::Storage("lock poisoned".to_string()))?;

        Ok(records.values().cloned().collect())
    }
}
