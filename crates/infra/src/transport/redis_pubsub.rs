//! Redis pub/sub-backed transport (broadcast-bus mode).
//!
//! Pub/sub is not durable: messages published while no subscriber is
//! attached are lost. That matches the bus deployment, where durability
//! lives in the record store, not the transport; a lost message shows up as
//! a stuck-RECEIVED record.

use std::sync::mpsc;
use std::thread;

use redis::Commands;
use tracing::error;

use ledgerflow_events::{Subscription, Transport, TransportMessage};

#[derive(Debug, thiserror::Error)]
pub enum RedisPubSubError {
    #[error("redis error: {0}")]
    Redis(String),
}

/// Redis pub/sub bus for raw message bodies.
#[derive(Debug, Clone)]
pub struct RedisPubSubTransport {
    client: redis::Client,
    channel: String,
}

impl RedisPubSubTransport {
    pub fn new(
        redis_url: impl AsRef<str>,
        channel: impl Into<String>,
    ) -> Result<Self, RedisPubSubError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| RedisPubSubError::Redis(e.to_string()))?;

        Ok(Self {
            client,
            channel: channel.into(),
        })
    }
}

impl Transport for RedisPubSubTransport {
    type Error = RedisPubSubError;

    fn send(&self, message: TransportMessage) -> Result<(), Self::Error> {
        let mut conn = self
            .client
            .get_connection()
            .map_err(|e| RedisPubSubError::Redis(e.to_string()))?;

        // Attributes are a queue-mode concern; the bus carries bodies only.
        let _: i64 = conn
            .publish(&self.channel, &message.body)
            .map_err(|e| RedisPubSubError::Redis(e.to_string()))?;

        Ok(())
    }

    fn subscribe(&self) -> Subscription<TransportMessage> {
        let (tx, rx) = mpsc::channel();

        let client = self.client.clone();
        let channel = self.channel.clone();

        // Background thread that receives pub/sub messages and forwards them.
        thread::spawn(move || {
            let mut conn = match client.get_connection() {
                Ok(c) => c,
                Err(e) => {
                    error!(error = %e, "redis pubsub subscriber failed to connect");
                    return;
                }
            };

            let mut pubsub = conn.as_pubsub();
            if pubsub.subscribe(channel).is_err() {
                return;
            }

            loop {
                let msg = match pubsub.get_message() {
                    Ok(m) => m,
                    Err(_) => return,
                };

                let body: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(_) => continue,
                };

                if tx.send(TransportMessage::new(body)).is_err() {
                    return;
                }
            }
        });

        Subscription::new(rx)
    }
}
