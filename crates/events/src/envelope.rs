//! Inbound envelope normalization.
//!
//! Messages arrive in one of two shapes depending on how the deployment
//! dispatches:
//!
//! - direct queue: the body **is** the `WorkflowEvent` JSON
//! - broadcast bus: the body is a bus entry whose `detail` field carries the
//!   event
//!
//! The consumer detects the shape per message; it has no static knowledge of
//! the deployment's transport mode. Detection order is fixed: try the direct
//! shape first, then the wrapped one.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::event::WorkflowEvent;

/// Source tag stamped on entries published to the broadcast bus.
pub const BUS_SOURCE: &str = "com.ledgerflow.workflow";

/// Entry shape published in event-bus mode.
///
/// `detail` carries the bare business payload, not a wrapped `WorkflowEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusEntry {
    pub source: String,
    pub detail_type: String,
    pub detail: JsonValue,
}

impl BusEntry {
    pub fn new(detail_type: impl Into<String>, detail: JsonValue) -> Self {
        Self {
            source: BUS_SOURCE.to_string(),
            detail_type: detail_type.into(),
            detail,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// The body is not JSON at all.
    #[error("message body is not valid JSON: {0}")]
    Malformed(String),

    /// The body is JSON but matches neither a workflow event nor an envelope
    /// whose `detail` holds one.
    #[error("message matches no known envelope shape")]
    Unrecognized,
}

/// Normalize a raw message body into a `WorkflowEvent`.
pub fn parse_envelope(raw: &str) -> Result<WorkflowEvent, EnvelopeError> {
    let value: JsonValue =
        serde_json::from_str(raw).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;

    if let Some(event) = as_workflow_event(&value) {
        return Ok(event);
    }

    if let Some(detail) = value.get("detail") {
        if let Some(event) = as_workflow_event(detail) {
            return Ok(event);
        }
    }

    Err(EnvelopeError::Unrecognized)
}

fn as_workflow_event(value: &JsonValue) -> Option<WorkflowEvent> {
    // Both identifying fields must be present as strings; `detail` may be
    // absent (it defaults to null).
    if value.get("eventId").is_some_and(JsonValue::is_string)
        && value.get("detailType").is_some_and(JsonValue::is_string)
    {
        serde_json::from_value(value.clone()).ok()
    } else {
        None
    }
}
