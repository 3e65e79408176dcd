//! Outbound ports: the pub/sub transport the bridge drives.

use crate::domain::error::TransportError;
use async_trait::async_trait;

/// Publishes raw payloads to a named channel.
#[async_trait]
pub trait RequestPublisher: Send + Sync {
    /// Publish `payload` on `channel`.
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// Source of raw inbound reply payloads.
#[async_trait]
pub trait ReplySource: Send + Sync {
    /// Receive the next payload (waits until one is available).
    ///
    /// `TransportError::ChannelClosed` means no further payloads will arrive.
    async fn receive(&self) -> Result<Vec<u8>, TransportError>;
}
