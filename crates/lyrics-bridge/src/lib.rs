//! Lyrics Bridge - correlated request/reply over pub/sub.
//!
//! A lyrics search worker listens on one channel and answers on another,
//! with no request IDs on the wire. This crate turns that exchange into a
//! call that either returns the matching result or gives up after a
//! timeout.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        LYRICS BRIDGE                              │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  caller ──search()──┐                                             │
//! │                     ▼                                             │
//! │  ┌──────────────────────────────┐    ┌─────────────────────────┐  │
//! │  │     PendingReplyStore        │◄───│     ReplyListener       │  │
//! │  │  "title:artist" → waiters    │    │  on_reply() per message │  │
//! │  │  (oneshot per waiter)        │    └───────────▲─────────────┘  │
//! │  └──────────────────────────────┘                │                │
//! │                     │ publish()                  │ receive()      │
//! │  ┌──────────────────▼───────────┐    ┌───────────┴─────────────┐  │
//! │  │      RequestPublisher        │    │      ReplySource        │  │
//! │  └──────────────────┬───────────┘    └───────────▲─────────────┘  │
//! └─────────────────────┼────────────────────────────┼────────────────┘
//!                       ▼                            │
//!               lyrics:requests              lyrics:results
//!                       │                            ▲
//!                       └──────► search worker ──────┘
//! ```
//!
//! # Correlation
//!
//! A reply is matched by `"title:artist"`, exact and case-sensitive. When
//! the worker echoes `request_title`/`request_artist` those win over the
//! (possibly canonicalized) result fields.
//!
//! # Usage
//!
//! ```ignore
//! use lyrics_bridge::{bus_transport, BridgeConfig, LyricsSearchBridge, ReplyListener};
//!
//! let config = BridgeConfig::from_env();
//! let (publisher, source) = bus_transport(bus, &config.channels.result);
//! let bridge = Arc::new(LyricsSearchBridge::new(&config, publisher)?);
//! tokio::spawn(ReplyListener::new(bridge.clone(), source).run());
//!
//! let result = bridge.search(&SearchRequest::new("Song X", "Artist Y")?).await?;
//! ```
//!
//! # Transports
//!
//! - [`adapters::bus`]: in-process, over `lyrics-bus`
//! - `adapters::redis`: Redis PUBLISH/SUBSCRIBE, behind the `redis` feature

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod ports;
pub mod service;

// Re-exports for public API
pub use adapters::{bus_transport, BusPublisher, BusReplySource};
#[cfg(feature = "redis")]
pub use adapters::{RedisPublisher, RedisReplySource};
pub use domain::config::{BridgeConfig, ConfigError};
pub use domain::correlation::CorrelationKey;
pub use domain::error::{BridgeError, BridgeResult, TransportError};
pub use domain::pending::{PendingReply, PendingReplyStore, PendingStats};
pub use domain::types::{LyricsSearchResult, SearchRequest};
pub use ipc::ReplyListener;
pub use ports::{LyricsSearchApi, ReplySource, RequestPublisher};
pub use service::{LyricsSearchBridge, ReplyOutcome};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
