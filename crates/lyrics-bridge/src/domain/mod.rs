//! Domain types for the bridge.
//!
//! Correlation, the pending reply registry, configuration and errors.

pub mod config;
pub mod correlation;
pub mod error;
pub mod pending;
pub mod types;

// Re-exports for convenience
pub use config::{BridgeConfig, ChannelConfig, ConfigError, RedisConfig, TimeoutConfig};
pub use correlation::CorrelationKey;
pub use error::{BridgeError, BridgeResult, TransportError};
pub use pending::{PendingReply, PendingReplyStore, PendingStats};
pub use types::{LyricsSearchResult, SearchRequest};
