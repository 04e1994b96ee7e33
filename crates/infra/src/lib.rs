//! Infrastructure layer: record persistence, transports, pipeline wiring.

pub mod consumer;
pub mod record_store;
pub mod status_tracker;
pub mod submitter;

/// Redis-backed transports (direct queue and broadcast bus).
#[cfg(feature = "redis")]
pub mod transport;

#[cfg(test)]
mod integration_tests;
