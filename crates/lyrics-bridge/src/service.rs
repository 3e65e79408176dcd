//! Lyrics search bridge service.
//!
//! Turns the fire-and-forget request/result channel pair into a
//! timeout-bounded call. The service owns the pending reply registry; the
//! publishing side and the reply listener both reach it through the same
//! `Arc<LyricsSearchBridge>`.

use crate::domain::config::BridgeConfig;
use crate::domain::correlation::CorrelationKey;
use crate::domain::error::{BridgeResult, TransportError};
use crate::domain::pending::{PendingReply, PendingReplyStore, PendingStats};
use crate::domain::types::{LyricsSearchResult, SearchRequest};
use crate::ipc::messages::{ReplyMessage, SearchRequestMessage};
use crate::ports::inbound::LyricsSearchApi;
use crate::ports::outbound::RequestPublisher;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// What `on_reply` did with an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Matched a pending search and woke its waiters
    Resolved { key: CorrelationKey, waiters: usize },
    /// Decoded, but nobody is waiting for it
    Orphaned { key: CorrelationKey },
    /// Not a valid reply payload
    Malformed,
}

/// Correlated request/reply bridge for lyrics searches.
pub struct LyricsSearchBridge {
    pending: PendingReplyStore,
    publisher: Arc<dyn RequestPublisher>,
    request_channel: String,
    default_timeout: Duration,
}

impl LyricsSearchBridge {
    /// Create a bridge publishing through `publisher`.
    ///
    /// Fails if `config` does not validate.
    pub fn new(config: &BridgeConfig, publisher: Arc<dyn RequestPublisher>) -> BridgeResult<Self> {
        config.validate()?;

        Ok(Self {
            pending: PendingReplyStore::new(),
            publisher,
            request_channel: config.channels.request.clone(),
            default_timeout: config.default_timeout(),
        })
    }

    /// Publish `request` on the request channel.
    ///
    /// Touches no local state; a failure here leaves registered waiters
    /// untouched.
    pub async fn publish(&self, request: &SearchRequest) -> Result<(), TransportError> {
        let payload = SearchRequestMessage::from(request)
            .encode()
            .map_err(|e| TransportError::PublishFailed(format!("encode failed: {e}")))?;

        self.publisher.publish(&self.request_channel, payload).await?;

        info!(
            title = request.title(),
            artist = request.artist(),
            channel = %self.request_channel,
            "Published search request"
        );
        Ok(())
    }

    /// Register a waiter for `request` without waiting yet.
    ///
    /// Use this before [`publish`](Self::publish) when the reply could
    /// arrive faster than the caller gets to [`wait`](Self::wait).
    pub fn register(&self, request: &SearchRequest) -> PendingReply<'_> {
        self.pending.register(request.correlation_key())
    }

    /// Suspend on a registered waiter.
    pub async fn wait(
        &self,
        pending: PendingReply<'_>,
        timeout: Option<Duration>,
    ) -> Option<LyricsSearchResult> {
        pending.wait(timeout.unwrap_or(self.default_timeout)).await
    }

    /// Register a waiter for `request` and suspend until its reply arrives
    /// or `timeout` elapses.
    pub async fn await_result(
        &self,
        request: &SearchRequest,
        timeout: Option<Duration>,
    ) -> Option<LyricsSearchResult> {
        let pending = self.register(request);
        self.wait(pending, timeout).await
    }

    /// Register, publish, then wait with the default timeout.
    ///
    /// A publish failure deregisters the waiter and is returned to the
    /// caller.
    pub async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<Option<LyricsSearchResult>, TransportError> {
        let pending = self.register(request);
        self.publish(request).await?;
        Ok(self.wait(pending, None).await)
    }

    /// Handle one raw inbound message.
    ///
    /// Never fails: malformed messages and replies nobody waits for are
    /// dropped. The outcome is informational.
    pub fn on_reply(&self, raw: &[u8]) -> ReplyOutcome {
        let reply = match ReplyMessage::decode(raw) {
            Ok(reply) => reply,
            Err(e) => {
                self.pending.record_malformed();
                warn!(
                    error = %e,
                    payload = %String::from_utf8_lossy(raw),
                    "Dropping malformed search reply"
                );
                return ReplyOutcome::Malformed;
            }
        };

        let key = reply.correlation_key();
        debug!(key = %key, "Received search reply");

        let title = reply.title.clone();
        let artist = reply.artist.clone();
        let waiters = self.pending.resolve(&key, reply.into_result());

        if waiters == 0 {
            debug!(key = %key, "No pending search for reply");
            return ReplyOutcome::Orphaned { key };
        }

        info!(
            key = %key,
            title = %title,
            artist = %artist,
            waiters = waiters,
            "Matched search reply"
        );
        ReplyOutcome::Resolved { key, waiters }
    }

    /// Get the pending reply registry
    pub fn pending(&self) -> &PendingReplyStore {
        &self.pending
    }

    /// Number of searches currently in flight
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }

    /// Whether anyone is waiting on `request`
    pub fn is_pending(&self, request: &SearchRequest) -> bool {
        self.pending.is_pending(&request.correlation_key())
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        self.pending.stats()
    }

    /// Timeout used when a caller passes none
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Channel requests are published on
    pub fn request_channel(&self) -> &str {
        &self.request_channel
    }
}

#[async_trait]
impl LyricsSearchApi for LyricsSearchBridge {
    async fn publish(&self, request: &SearchRequest) -> Result<(), TransportError> {
        LyricsSearchBridge::publish(self, request).await
    }

    async fn await_result(
        &self,
        request: &SearchRequest,
        timeout: Option<Duration>,
    ) -> Option<LyricsSearchResult> {
        LyricsSearchBridge::await_result(self, request, timeout).await
    }

    async fn search(
        &self,
        request: &SearchRequest,
    ) -> Result<Option<LyricsSearchResult>, TransportError> {
        LyricsSearchBridge::search(self, request).await
    }
}
