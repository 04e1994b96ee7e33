//! Redis-backed transports.
//!
//! Streams cover direct-queue deployments (consumer groups, competing
//! workers); pub/sub covers broadcast-bus deployments (fire-and-forget
//! fan-out). Both feed the channel-backed `Subscription` from a background
//! thread.

mod redis_pubsub;
mod redis_streams;

pub use redis_pubsub::{RedisPubSubError, RedisPubSubTransport};
pub use redis_streams::{RedisStreamsError, RedisStreamsTransport};
