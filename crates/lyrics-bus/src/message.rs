//! # Bus Message
//!
//! The unit carried by the bus: a channel name and an opaque payload.

use std::sync::Arc;

/// A payload published on a named channel.
///
/// Payload bytes are shared so fan-out to many subscribers does not copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    channel: Arc<str>,
    payload: Arc<[u8]>,
}

impl BusMessage {
    /// Create a message for `channel`.
    pub fn new(channel: impl Into<Arc<str>>, payload: impl Into<Arc<[u8]>>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }

    /// Channel this message was published on.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Raw payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Copy the payload out of the shared buffer.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.payload.to_vec()
    }
}
