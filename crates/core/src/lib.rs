//! `ledgerflow-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod event_type;
pub mod id;
pub mod status;

pub use error::{DomainError, DomainResult};
pub use event_type::EventType;
pub use id::EventId;
pub use status::EventStatus;
