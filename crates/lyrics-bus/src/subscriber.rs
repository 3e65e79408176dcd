//! # Subscription
//!
//! Defines the receiving side of the bus.

use crate::message::BusMessage;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was dropped.
    #[error("Message bus closed")]
    Closed,
}

/// A subscription handle for one channel.
///
/// When dropped, the channel's subscriber count is decremented.
pub struct Subscription {
    receiver: broadcast::Receiver<BusMessage>,
    channel: String,
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<BusMessage>,
        channel: String,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
    ) -> Self {
        Self {
            receiver,
            channel,
            subscriptions,
        }
    }

    /// Receive the next message published on this subscription's channel.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next message on the channel
    /// - `None` - The bus was dropped
    pub async fn recv(&mut self) -> Option<BusMessage> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(
                        channel = %self.channel,
                        lagged = count,
                        "Subscriber lagged, some messages dropped"
                    );
                    continue;
                }
            };

            if message.channel() == self.channel {
                return Some(message);
            }
        }
    }

    /// Try to receive the next message without waiting.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was available on the channel
    /// - `Ok(None)` - Nothing available right now
    /// - `Err(SubscriptionError::Closed)` - The bus was dropped
    pub fn try_recv(&mut self) -> Result<Option<BusMessage>, SubscriptionError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if message.channel() == self.channel {
                return Ok(Some(message));
            }
        }
    }

    /// Channel this subscription listens on.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        if let Some(count) = subs.get_mut(&self.channel) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                subs.remove(&self.channel);
            }
        }
        debug!(channel = %self.channel, "Subscription dropped");
    }
}
