//! Dispatch from detail type to handler capability.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use ledgerflow_core::EventType;

use crate::event::WorkflowEvent;
use crate::handler::{HandlerError, WorkflowHandlers};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// The matched handler failed; routing fails as a whole.
    #[error("handler for {event_type} failed: {source}")]
    Handler {
        event_type: String,
        #[source]
        source: HandlerError,
    },
}

/// Routes events over the closed registry.
///
/// Dispatch is an exhaustive match: adding a registry variant without a
/// routing arm is a compile error. Unknown detail types are logged and
/// succeed without invoking any handler, so a newer producer never wedges an
/// older consumer.
pub struct EventRouter {
    handlers: Arc<dyn WorkflowHandlers>,
}

impl EventRouter {
    pub fn new(handlers: Arc<dyn WorkflowHandlers>) -> Self {
        Self { handlers }
    }

    pub fn route(&self, event: &WorkflowEvent) -> Result<(), RoutingError> {
        let result = match event.event_type() {
            EventType::RegisterCustomer => self.handlers.on_register_customer(event),
            EventType::OpenAccount => self.handlers.on_open_account(event),
            EventType::Deposit => self.handlers.on_deposit(event),
            EventType::Payout => self.handlers.on_payout(event),
            EventType::Unknown(other) => {
                warn!(event_id = %event.event_id, detail_type = %other, "unknown event type, skipping");
                return Ok(());
            }
        };

        result.map_err(|source| RoutingError::Handler {
            event_type: event.detail_type.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHandlers {
        calls: Mutex<Vec<&'static str>>,
        fail_deposit: bool,
    }

    impl RecordingHandlers {
        fn failing_deposits() -> Self {
            Self {
                fail_deposit: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl WorkflowHandlers for RecordingHandlers {
        fn on_register_customer(&self, _: &WorkflowEvent) -> Result<(), HandlerError> {
            self.calls.lock().unwrap().push("register");
            Ok(())
        }

        fn on_open_account(&self, _: &WorkflowEvent) -> Result<(), HandlerError> {
            self.calls.lock().unwrap().push("open_account");
            Ok(())
        }

        fn on_deposit(&self, _: &WorkflowEvent) -> Result<(), HandlerError> {
            self.calls.lock().unwrap().push("deposit");
            if self.fail_deposit {
                return Err(HandlerError::new("ledger unavailable"));
            }
            Ok(())
        }

        fn on_payout(&self, _: &WorkflowEvent) -> Result<(), HandlerError> {
            self.calls.lock().unwrap().push("payout");
            Ok(())
        }
    }

    fn event(detail_type: &str) -> WorkflowEvent {
        WorkflowEvent::new("e-1", detail_type, json!({}))
    }

    #[test]
    fn known_types_reach_their_handler() {
        let handlers = Arc::new(RecordingHandlers::default());
        let router = EventRouter::new(handlers.clone());

        router.route(&event("Deposit")).unwrap();
        router.route(&event("Payout")).unwrap();
        router.route(&event("RegisterCustomer")).unwrap();
        router.route(&event("OpenAccount")).unwrap();

        assert_eq!(
            handlers.calls(),
            vec!["deposit", "payout", "register", "open_account"]
        );
    }

    #[test]
    fn unknown_types_succeed_without_invoking_handlers() {
        let handlers = Arc::new(RecordingHandlers::default());
        let router = EventRouter::new(handlers.clone());

        router.route(&event("CloseAccount")).unwrap();

        assert!(handlers.calls().is_empty());
    }

    #[test]
    fn handler_failure_fails_routing_with_context() {
        let handlers = Arc::new(RecordingHandlers::failing_deposits());
        let router = EventRouter::new(handlers);

        let err = router.route(&event("Deposit")).unwrap_err();
        let RoutingError::Handler { event_type, source } = err;
        assert_eq!(event_type, "Deposit");
        assert_eq!(source, HandlerError::new("ledger unavailable"));
    }
}
