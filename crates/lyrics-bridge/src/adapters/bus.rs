//! In-process transport over `lyrics-bus`.
//!
//! Used when the search worker runs in the same process (tests, local
//! development) instead of behind Redis.

use crate::domain::error::TransportError;
use crate::ports::outbound::{ReplySource, RequestPublisher};
use async_trait::async_trait;
use lyrics_bus::{InMemoryMessageBus, MessagePublisher, Subscription};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Publishes search requests onto the in-memory bus.
pub struct BusPublisher {
    bus: Arc<InMemoryMessageBus>,
}

impl BusPublisher {
    pub fn new(bus: Arc<InMemoryMessageBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl RequestPublisher for BusPublisher {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        // Zero receivers is not a fault: pub/sub gives no delivery guarantee
        let receivers = self.bus.publish(channel, payload).await;
        debug!(channel = channel, receivers = receivers, "Request handed to bus");
        Ok(())
    }
}

/// Receives search replies from one bus channel.
pub struct BusReplySource {
    subscription: Mutex<Subscription>,
}

impl BusReplySource {
    /// Subscribe to `channel` now; replies published before this call are
    /// not seen.
    pub fn subscribe(bus: &InMemoryMessageBus, channel: &str) -> Self {
        Self {
            subscription: Mutex::new(bus.subscribe(channel)),
        }
    }
}

#[async_trait]
impl ReplySource for BusReplySource {
    async fn receive(&self) -> Result<Vec<u8>, TransportError> {
        let mut subscription = self.subscription.lock().await;
        subscription
            .recv()
            .await
            .map(|message| message.to_vec())
            .ok_or(TransportError::ChannelClosed)
    }
}

/// Build both halves of a bus transport.
pub fn bus_transport(
    bus: Arc<InMemoryMessageBus>,
    result_channel: &str,
) -> (Arc<BusPublisher>, Arc<BusReplySource>) {
    let source = Arc::new(BusReplySource::subscribe(&bus, result_channel));
    let publisher = Arc::new(BusPublisher::new(bus));
    (publisher, source)
}
