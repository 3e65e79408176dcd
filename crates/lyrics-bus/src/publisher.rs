//! # Message Publisher
//!
//! Defines the publishing side of the bus.

use crate::message::BusMessage;
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing payloads to a named channel.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish `payload` on `channel`.
    ///
    /// # Returns
    ///
    /// The number of subscribers of `channel` that received the payload.
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> usize;

    /// Get the total number of messages published.
    fn messages_published(&self) -> u64;
}

/// In-memory implementation of the bus.
///
/// Uses a single `tokio::sync::broadcast` channel; subscriptions filter by
/// channel name on receive. Suitable for single-process operation and tests;
/// cross-process deployments use Redis pub/sub instead.
pub struct InMemoryMessageBus {
    /// Broadcast sender for all channels.
    sender: broadcast::Sender<BusMessage>,

    /// Active subscription count by channel.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total messages published.
    messages_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryMessageBus {
    /// Create a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            messages_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to a channel.
    #[must_use]
    pub fn subscribe(&self, channel: &str) -> Subscription {
        let receiver = self.sender.subscribe();

        if let Ok(mut subs) = self.subscriptions.write() {
            *subs.entry(channel.to_string()).or_insert(0) += 1;
        }

        debug!(channel = channel, "New subscription created");

        Subscription::new(receiver, channel.to_string(), self.subscriptions.clone())
    }

    /// Get the number of active subscribers across all channels.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the number of active subscribers of one channel.
    #[must_use]
    pub fn channel_subscribers(&self, channel: &str) -> usize {
        self.subscriptions
            .read()
            .map(|subs| subs.get(channel).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryMessageBus {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> usize {
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        let listeners = self.channel_subscribers(channel);
        if listeners == 0 {
            warn!(channel = channel, "Message dropped (no subscribers)");
            return 0;
        }

        match self.sender.send(BusMessage::new(channel, payload)) {
            Ok(_) => {
                debug!(
                    channel = channel,
                    receivers = listeners,
                    "Message published"
                );
                listeners
            }
            Err(e) => {
                warn!(channel = channel, error = %e, "Message dropped (no receivers)");
                0
            }
        }
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
