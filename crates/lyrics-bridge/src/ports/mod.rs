//! Ports (hexagonal architecture).

pub mod inbound;
pub mod outbound;

pub use inbound::LyricsSearchApi;
pub use outbound::{ReplySource, RequestPublisher};
