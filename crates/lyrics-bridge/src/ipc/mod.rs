//! Wire messages and the reply listener.
//!
//! Requests and replies travel as JSON objects on two pub/sub channels.

pub mod listener;
pub mod messages;

pub use listener::ReplyListener;
pub use messages::{ReplyMessage, SearchRequestMessage};
