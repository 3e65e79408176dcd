//! Reply listener.
//!
//! Drains the result channel and feeds every message to
//! [`LyricsSearchBridge::on_reply`]. One listener per bridge.

use crate::domain::error::TransportError;
use crate::ports::outbound::ReplySource;
use crate::service::{LyricsSearchBridge, ReplyOutcome};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Long-running consumer of search replies.
pub struct ReplyListener {
    bridge: Arc<LyricsSearchBridge>,
    source: Arc<dyn ReplySource>,
}

impl ReplyListener {
    pub fn new(bridge: Arc<LyricsSearchBridge>, source: Arc<dyn ReplySource>) -> Self {
        Self { bridge, source }
    }

    /// Run until the source closes.
    ///
    /// Returns the number of messages handed to the bridge.
    pub async fn run(self) -> u64 {
        let mut handled = 0;
        loop {
            match self.source.receive().await {
                Ok(raw) => {
                    self.handle(&raw);
                    handled += 1;
                }
                Err(TransportError::ChannelClosed) => {
                    warn!("Result channel closed, stopping reply listener");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Error receiving search reply");
                }
            }
        }
        handled
    }

    /// Run until the source closes or `shutdown` flips to `true`.
    pub async fn run_until_shutdown(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut handled = 0;
        if *shutdown.borrow() {
            return handled;
        }

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender counts as shutdown
                    if changed.is_err() || *shutdown.borrow() {
                        info!(handled = handled, "Reply listener shutting down");
                        break;
                    }
                }
                received = self.source.receive() => match received {
                    Ok(raw) => {
                        self.handle(&raw);
                        handled += 1;
                    }
                    Err(TransportError::ChannelClosed) => {
                        warn!("Result channel closed, stopping reply listener");
                        break;
                    }
                    Err(e) => {
                        error!(error = %e, "Error receiving search reply");
                    }
                }
            }
        }
        handled
    }

    fn handle(&self, raw: &[u8]) {
        if let ReplyOutcome::Orphaned { key } = self.bridge.on_reply(raw) {
            debug!(key = %key, "Reply for unknown or expired search");
        }
    }
}
