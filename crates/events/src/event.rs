//! Canonical workflow event model.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use ledgerflow_core::EventType;

/// The canonical event exchanged between submitter and consumer.
///
/// `detail` is the business payload. This layer passes it through untouched;
/// only the injected handlers interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEvent {
    /// Opaque unique identifier, the join key between the dispatched message
    /// and the persisted record.
    pub event_id: String,
    /// Event-kind string, resolved against the registry at routing time.
    pub detail_type: String,
    #[serde(default)]
    pub detail: JsonValue,
}

impl WorkflowEvent {
    pub fn new(
        event_id: impl Into<String>,
        detail_type: impl Into<String>,
        detail: JsonValue,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            detail_type: detail_type.into(),
            detail,
        }
    }

    /// Resolve the detail type against the registry.
    pub fn event_type(&self) -> EventType {
        EventType::from(self.detail_type.as_str())
    }
}
