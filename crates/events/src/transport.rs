//! Message transport abstraction (mechanics only).
//!
//! The transport moves opaque message bodies from the submitter to consumer
//! workers. Two deployment modes exist (direct queue, broadcast bus), but the
//! trait makes no assumption about which; implementations decide delivery and
//! durability semantics.
//!
//! Delivery is **at-least-once** everywhere: messages may arrive more than
//! once and consumers must be idempotent. The record store, not the
//! transport, is the source of truth; events are persisted before they are
//! handed to `send`, so a lost or duplicated message is observable rather
//! than corrupting.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A message as it travels over a transport.
///
/// `attributes` carry out-of-band metadata (`eventId` and `type` in
/// direct-queue mode) so consumers can filter without deserializing the body.
/// Broadcast-bus messages carry no attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    pub body: String,
    pub attributes: Vec<(String, String)>,
    /// Delivery receipt for transports with explicit acknowledgement. `None`
    /// on transports that have none (in-memory, pub/sub).
    pub receipt: Option<String>,
}

impl TransportMessage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            attributes: Vec::new(),
            receipt: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_receipt(mut self, receipt: impl Into<String>) -> Self {
        self.receipt = Some(receipt.into());
        self
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A subscription to a transport's message flow.
///
/// Backed by a channel the implementation feeds. Designed for
/// single-threaded consumption; spawn one worker per subscription.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Message transport (send/subscribe).
///
/// `send` failures surface to the submitter, which leaves the RECEIVED record
/// in place as the stuck-dispatch signal. `subscribe` hands back a
/// channel-backed subscription the implementation feeds from whatever
/// mechanism it uses (in-memory fan-out, consumer groups, pub/sub).
pub trait Transport: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn send(&self, message: TransportMessage) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<TransportMessage>;

    /// Acknowledge a delivered message by its receipt. A message left
    /// unacknowledged stays eligible for redelivery on transports that track
    /// pending deliveries; transports without explicit acknowledgement ignore
    /// this.
    fn ack(&self, _receipt: &str) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    type Error = T::Error;

    fn send(&self, message: TransportMessage) -> Result<(), Self::Error> {
        (**self).send(message)
    }

    fn subscribe(&self) -> Subscription<TransportMessage> {
        (**self).subscribe()
    }

    fn ack(&self, receipt: &str) -> Result<(), Self::Error> {
        (**self).ack(receipt)
    }
}
