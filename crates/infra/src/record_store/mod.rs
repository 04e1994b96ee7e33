//! Workflow event record persistence.

mod in_memory;
mod postgres;
mod r#trait;

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;
pub use r#trait::{RecordStore, RecordStoreError, WorkflowEventRecord};
