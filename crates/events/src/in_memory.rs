//! In-memory transport for tests/dev.

use std::sync::{Mutex, mpsc};

use crate::transport::{Subscription, Transport, TransportMessage};

#[derive(Debug)]
pub enum InMemoryTransportError {
    /// Send failed due to internal lock poisoning.
    Poisoned,
}

/// In-memory fan-out transport.
///
/// - No IO / no async
/// - Broadcast: every subscriber sees every message
/// - At-least-once acceptable (consumers must be idempotent)
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    subscribers: Mutex<Vec<mpsc::Sender<TransportMessage>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for InMemoryTransport {
    type Error = InMemoryTransportError;

    fn send(&self, message: TransportMessage) -> Result<(), Self::Error> {
        let mut subs = self
            .subscribers
            .lock()
            .map_err(|_| InMemoryTransportError::Poisoned)?;

        // Drop any dead subscribers while sending.
        subs.retain(|tx| tx.send(message.clone()).is_ok());

        Ok(())
    }

    fn subscribe(&self) -> Subscription<TransportMessage> {
        let (tx, rx) = mpsc::channel();

        // If the lock is poisoned, we still return a subscription;
        // it just won't receive messages until the process restarts.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn every_subscriber_sees_every_message() {
        let transport = InMemoryTransport::new();
        let sub_a = transport.subscribe();
        let sub_b = transport.subscribe();

        transport
            .send(TransportMessage::new("hello").with_attribute("type", "Deposit"))
            .unwrap();

        for sub in [&sub_a, &sub_b] {
            let msg = sub.recv_timeout(Duration::from_secs(1)).unwrap();
            assert_eq!(msg.body, "hello");
            assert_eq!(msg.attribute("type"), Some("Deposit"));
        }
    }

    #[test]
    fn dropped_subscribers_do_not_block_send() {
        let transport = InMemoryTransport::new();
        drop(transport.subscribe());

        let sub = transport.subscribe();
        transport.send(TransportMessage::new("still delivered")).unwrap();
        assert_eq!(
            sub.recv_timeout(Duration::from_secs(1)).unwrap().body,
            "still delivered"
        );
    }

    #[test]
    fn send_without_subscribers_succeeds() {
        let transport = InMemoryTransport::new();
        assert!(transport.send(TransportMessage::new("void")).is_ok());
    }
}
