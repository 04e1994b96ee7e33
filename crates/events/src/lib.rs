//! `ledgerflow-events`: wire-level event model and transport-agnostic seams.
//!
//! Everything here is mechanics: the canonical `WorkflowEvent`, envelope
//! normalization for the two message shapes, the `Transport` trait with an
//! in-memory implementation, and routing into injected business handlers.
//! No IO and no storage live in this crate.

pub mod envelope;
pub mod event;
pub mod handler;
pub mod in_memory;
pub mod requests;
pub mod router;
pub mod transport;

pub use envelope::{BUS_SOURCE, BusEntry, EnvelopeError, parse_envelope};
pub use event::WorkflowEvent;
pub use handler::{HandlerError, NoopHandlers, WorkflowHandlers};
pub use in_memory::InMemoryTransport;
pub use requests::{DepositRequest, OpenAccountRequest, PaymentInstructionRequest, RegisterRequest};
pub use router::{EventRouter, RoutingError};
pub use transport::{Subscription, Transport, TransportMessage};
