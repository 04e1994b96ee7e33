//! Business handler capability.
//!
//! Routing terminates in exactly one handler call per declared event kind.
//! The pipeline ships with no-op handlers; real business logic plugs in
//! behind this trait without touching submission, parsing, or status
//! tracking.

use thiserror::Error;
use tracing::debug;

use crate::event::WorkflowEvent;

/// Error returned by a business handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// One capability method per event kind in the registry.
pub trait WorkflowHandlers: Send + Sync {
    fn on_register_customer(&self, event: &WorkflowEvent) -> Result<(), HandlerError>;

    fn on_open_account(&self, event: &WorkflowEvent) -> Result<(), HandlerError>;

    fn on_deposit(&self, event: &WorkflowEvent) -> Result<(), HandlerError>;

    fn on_payout(&self, event: &WorkflowEvent) -> Result<(), HandlerError>;
}

/// Stub handlers: acknowledge the event and do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandlers;

impl WorkflowHandlers for NoopHandlers {
    fn on_register_customer(&self, event: &WorkflowEvent) -> Result<(), HandlerError> {
        debug!(event_id = %event.event_id, "handling customer registration");
        Ok(())
    }

    fn on_open_account(&self, event: &WorkflowEvent) -> Result<(), HandlerError> {
        debug!(event_id = %event.event_id, "handling account opening");
        Ok(())
    }

    fn on_deposit(&self, event: &WorkflowEvent) -> Result<(), HandlerError> {
        debug!(event_id = %event.event_id, "handling deposit");
        Ok(())
    }

    fn on_payout(&self, event: &WorkflowEvent) -> Result<(), HandlerError> {
        debug!(event_id = %event.event_id, "handling payout");
        Ok(())
    }
}
