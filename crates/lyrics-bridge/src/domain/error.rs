//! Bridge error types.
//!
//! Timeouts are not errors here: an expired wait resolves to `None`.

use crate::domain::config::ConfigError;

/// Failures talking to the pub/sub transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Transport was shut down
    #[error("channel closed")]
    ChannelClosed,

    /// A message could not be handed to the broker
    #[error("publish failed: {0}")]
    PublishFailed(String),

    /// Receiving from the broker failed; the subscription may still be usable
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Could not connect or subscribe to the broker
    #[error("connection error: {0}")]
    Connection(String),
}

/// Bridge-level errors (construction, wiring and propagated transport faults).
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Request identity failed validation
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// Configuration failed validation
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport fault
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
