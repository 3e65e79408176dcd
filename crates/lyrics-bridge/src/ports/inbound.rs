//! Inbound port: what the bridge offers to callers.

use crate::domain::error::TransportError;
use crate::domain::types::{LyricsSearchResult, SearchRequest};
use async_trait::async_trait;
use std::time::Duration;

/// Lyrics search as a timeout-bounded call.
#[async_trait]
pub trait LyricsSearchApi: Send + Sync {
    /// Emit a search request on the outbound channel.
    async fn publish(&self, request: &SearchRequest) -> Result<(), TransportError>;

    /// Wait for the reply to `request`.
    ///
    /// `None` when no reply arrived within `timeout` (or the configured
    /// default when `timeout` is `None`).
    async fn await_result(
        &self,
        request: &SearchRequest,
        timeout: Option<Duration>,
    ) -> Option<LyricsSearchResult>;

    /// Register, publish, then wait with the default timeout.
    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<Option<LyricsSearchResult>, TransportError>;
}
