//! Redis Streams-backed transport (direct-queue mode).
//!
//! XADD carries the message body plus its attributes as stream fields, so
//! consumers can inspect `eventId`/`type` without touching the body.
//! Consumer groups give competing-consumer semantics: each entry goes to one
//! worker in the group and stays in the pending entry list until that worker
//! acknowledges it, so unacknowledged entries remain claimable for
//! redelivery (XAUTOCLAIM or a group restart).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tracing::{error, warn};

use ledgerflow_events::{Subscription, Transport, TransportMessage};

const DEFAULT_STREAM_KEY: &str = "ledgerflow:events";
const DEFAULT_GROUP: &str = "workflow-consumer";
const READ_BLOCK_MS: u64 = 1000;
const READ_COUNT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum RedisStreamsError {
    #[error("redis connection error: {0}")]
    Connection(String),

    #[error("redis command error: {0}")]
    Command(String),

    #[error("stream entry decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct RedisStreamsTransport {
    client: Arc<redis::Client>,
    stream_key: String,
    group: String,
}

impl RedisStreamsTransport {
    /// Create a transport over a Redis connection URL.
    ///
    /// `stream_key` and `group` default to `ledgerflow:events` /
    /// `workflow-consumer` when not given.
    pub fn new(
        redis_url: impl AsRef<str>,
        stream_key: Option<String>,
        group: Option<String>,
    ) -> Result<Self, RedisStreamsError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| RedisStreamsError::Connection(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            stream_key: stream_key.unwrap_or_else(|| DEFAULT_STREAM_KEY.to_string()),
            group: group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
        })
    }

    fn connection(&self) -> Result<redis::Connection, RedisStreamsError> {
        self.client
            .get_connection()
            .map_err(|e| RedisStreamsError::Connection(e.to_string()))
    }

    /// Ensure the consumer group exists (idempotent).
    fn ensure_consumer_group(&self) -> Result<(), RedisStreamsError> {
        let mut conn = self.connection()?;

        // XGROUP CREATE with MKSTREAM creates the stream if missing. An error
        // here means the group already exists, which is fine.
        let _: Result<String, _> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.stream_key)
            .arg(&self.group)
            .arg("0")
            .arg("MKSTREAM")
            .query(&mut conn);

        Ok(())
    }

    fn send_sync(&self, message: &TransportMessage) -> Result<(), RedisStreamsError> {
        let mut conn = self.connection()?;

        let mut cmd = redis::cmd("XADD");
        cmd.arg(&self.stream_key).arg("*");
        for (name, value) in &message.attributes {
            cmd.arg(name).arg(value);
        }
        cmd.arg("body").arg(&message.body);

        let _: String = cmd
            .query(&mut conn)
            .map_err(|e| RedisStreamsError::Command(format!("XADD failed: {e}")))?;

        Ok(())
    }

    fn read_group(
        &self,
        conn: &mut redis::Connection,
        consumer: &str,
    ) -> Result<Vec<TransportMessage>, RedisStreamsError> {
        let result: redis::RedisResult<HashMap<String, Vec<redis::Value>>> =
            redis::cmd("XREADGROUP")
                .arg("GROUP")
                .arg(&self.group)
                .arg(consumer)
                .arg("COUNT")
                .arg(READ_COUNT)
                .arg("BLOCK")
                .arg(READ_BLOCK_MS)
                .arg("STREAMS")
                .arg(&self.stream_key)
                .arg(">")
                .query(conn);

        let stream_data = match result {
            Ok(data) => data,
            // A nil reply (blocking timeout, no new entries) decodes as a
            // type error.
            Err(e) if e.kind() == redis::ErrorKind::TypeError => return Ok(vec![]),
            Err(e) => {
                return Err(RedisStreamsError::Command(format!("XREADGROUP failed: {e}")));
            }
        };

        let entries = stream_data
            .get(&self.stream_key)
            .cloned()
            .unwrap_or_default();

        let mut messages = Vec::new();
        for entry in entries {
            match parse_stream_entry(entry) {
                Ok(parsed) => messages.push(parsed),
                Err(e) => warn!(error = %e, "skipping undecodable stream entry"),
            }
        }

        Ok(messages)
    }
}

/// Entry format: `[message_id, [field1, value1, field2, value2, ...]]`.
/// The `body` field becomes the message body; everything else is an
/// attribute. The entry id becomes the message receipt for XACK.
fn parse_stream_entry(entry: redis::Value) -> Result<TransportMessage, RedisStreamsError> {
    let entry_vec = match entry {
        redis::Value::Bulk(v) => v,
        _ => return Err(RedisStreamsError::Decode("unexpected entry shape".to_string())),
    };

    if entry_vec.len() < 2 {
        return Err(RedisStreamsError::Decode("entry too short".to_string()));
    }

    let message_id = match &entry_vec[0] {
        redis::Value::Data(data) => String::from_utf8_lossy(data).to_string(),
        _ => return Err(RedisStreamsError::Decode("invalid message id".to_string())),
    };

    let fields_vec = match &entry_vec[1] {
        redis::Value::Bulk(v) => v,
        _ => return Err(RedisStreamsError::Decode("invalid field list".to_string())),
    };

    let mut body = None;
    let mut attributes = Vec::new();
    for chunk in fields_vec.chunks(2) {
        if let [redis::Value::Data(name), redis::Value::Data(value)] = chunk {
            let name = String::from_utf8_lossy(name).to_string();
            let value = String::from_utf8_lossy(value).to_string();
            if name == "body" {
                body = Some(value);
            } else {
                attributes.push((name, value));
            }
        }
    }

    let body = body.ok_or_else(|| RedisStreamsError::Decode("missing body field".to_string()))?;

    Ok(TransportMessage {
        body,
        attributes,
        receipt: Some(message_id),
    })
}

impl Transport for RedisStreamsTransport {
    type Error = RedisStreamsError;

    fn send(&self, message: TransportMessage) -> Result<(), Self::Error> {
        self.send_sync(&message)
    }

    fn subscribe(&self) -> Subscription<TransportMessage> {
        let (tx, rx) = mpsc::channel();

        if let Err(e) = self.ensure_consumer_group() {
            error!(error = %e, "failed to ensure consumer group");
        }

        let transport = self.clone();
        let consumer = format!("consumer-{}", uuid::Uuid::new_v4());

        // Background thread polls the group and feeds the channel. Entries
        // are NOT acknowledged here: the consuming worker acks through the
        // receipt once processing finishes, so a crash or handler failure
        // leaves the entry pending for redelivery.
        thread::spawn(move || {
            let mut conn = match transport.connection() {
                Ok(c) => c,
                Err(e) => {
                    error!(error = %e, "redis streams subscriber failed to connect");
                    return;
                }
            };

            loop {
                match transport.read_group(&mut conn, &consumer) {
                    Ok(messages) => {
                        for message in messages {
                            if tx.send(message).is_err() {
                                return; // Receiver dropped.
                            }
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "failed to read from stream");
                        thread::sleep(Duration::from_millis(READ_BLOCK_MS));
                    }
                }
            }
        });

        Subscription::new(rx)
    }

    fn ack(&self, receipt: &str) -> Result<(), Self::Error> {
        let mut conn = self.connection()?;

        let _: u64 = redis::cmd("XACK")
            .arg(&self.stream_key)
            .arg(&self.group)
            .arg(receipt)
            .query(&mut conn)
            .map_err(|e| RedisStreamsError::Command(format!("XACK failed: {e}")))?;

        Ok(())
    }
}
