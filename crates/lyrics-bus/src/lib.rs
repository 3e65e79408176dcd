//! # Lyrics Bus - In-Process Pub/Sub
//!
//! A named-channel message bus with the same shape as the Redis pub/sub
//! exchange used in production: publishers push raw payloads onto a channel
//! name, subscribers receive every payload sent to the channel they joined.
//!
//! ```text
//! ┌──────────────┐  publish("lyrics:requests")   ┌──────────────┐
//! │   Bridge     │ ─────────────┐                │ Search worker│
//! │              │              ▼                │              │
//! │              │        ┌──────────────┐       │              │
//! │              │ ◀───── │  Message Bus │ ◀──── │              │
//! └──────────────┘        └──────────────┘       └──────────────┘
//!        subscribe("lyrics:results")     publish("lyrics:results")
//! ```
//!
//! Delivery is at-most-once: a payload published while nobody is subscribed
//! to its channel is dropped.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod message;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use message::BusMessage;
pub use publisher::{InMemoryMessageBus, MessagePublisher};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum messages to buffer per subscriber before the slowest one lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
