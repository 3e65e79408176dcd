//! Pending Reply Store - the async-to-sync bridge registry.
//!
//! Maps correlation keys to callers suspended on a search reply. Every
//! waiter leaves the map through exactly one of three doors:
//!
//! 1. `resolve()` - a matching reply arrived (listener path)
//! 2. `expire()` - the caller's deadline passed (timeout path)
//! 3. `abandon()` - the waiting future was dropped (guard path)
//!
//! All three remove under the map's shard lock, so whichever runs first
//! owns the waiter and the others find nothing.

use crate::domain::correlation::CorrelationKey;
use crate::domain::types::LyricsSearchResult;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Identifies one waiter among those sharing a key.
pub type WaiterId = u64;

/// A suspended caller
struct Waiter {
    id: WaiterId,
    sender: oneshot::Sender<LyricsSearchResult>,
    registered_at: Instant,
}

/// Statistics for the pending reply store
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total waiters registered
    pub total_registered: AtomicU64,
    /// Waiters that joined a key already in flight
    pub total_joined: AtomicU64,
    /// Waiters resolved with a reply
    pub total_resolved: AtomicU64,
    /// Waiters resolved with absence after their deadline
    pub total_timeouts: AtomicU64,
    /// Waiters whose future was dropped before resolution
    pub total_abandoned: AtomicU64,
    /// Replies that matched no waiter
    pub total_orphaned: AtomicU64,
    /// Inbound messages that could not be decoded
    pub total_malformed: AtomicU64,
}

impl PendingStats {
    pub fn registered(&self) -> u64 {
        self.total_registered.load(Ordering::Relaxed)
    }

    pub fn resolved(&self) -> u64 {
        self.total_resolved.load(Ordering::Relaxed)
    }

    pub fn timeouts(&self) -> u64 {
        self.total_timeouts.load(Ordering::Relaxed)
    }

    pub fn abandoned(&self) -> u64 {
        self.total_abandoned.load(Ordering::Relaxed)
    }

    pub fn orphaned(&self) -> u64 {
        self.total_orphaned.load(Ordering::Relaxed)
    }

    pub fn malformed(&self) -> u64 {
        self.total_malformed.load(Ordering::Relaxed)
    }
}

/// Registry of callers waiting on a reply.
///
/// At most one entry exists per key. A second wait on a key that is already
/// in flight joins the existing entry; one reply resolves every waiter in it.
#[derive(Default)]
pub struct PendingReplyStore {
    pending: DashMap<CorrelationKey, Vec<Waiter>>,
    next_id: AtomicU64,
    stats: PendingStats,
}

impl PendingReplyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a waiter for `key`.
    ///
    /// The returned handle deregisters itself if dropped before resolution.
    pub fn register(&self, key: CorrelationKey) -> PendingReply<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();

        let waiter = Waiter {
            id,
            sender: tx,
            registered_at: Instant::now(),
        };

        let joined = {
            let mut entry = self.pending.entry(key.clone()).or_default();
            let joined = !entry.is_empty();
            entry.push(waiter);
            joined
        };

        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
        if joined {
            self.stats.total_joined.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, waiter = id, "Joined in-flight search");
        } else {
            debug!(key = %key, waiter = id, "Registered pending search");
        }

        PendingReply {
            store: self,
            key,
            id,
            receiver: rx,
            armed: true,
        }
    }

    /// Resolve every waiter registered under `key` with `result`.
    ///
    /// Returns the number of waiters that received the result; 0 means the
    /// reply was an orphan.
    pub fn resolve(&self, key: &CorrelationKey, result: LyricsSearchResult) -> usize {
        let Some((_, waiters)) = self.pending.remove(key) else {
            self.stats.total_orphaned.fetch_add(1, Ordering::Relaxed);
            return 0;
        };

        let mut delivered = 0;
        for waiter in waiters {
            let response_time = waiter.registered_at.elapsed();
            if waiter.sender.send(result.clone()).is_ok() {
                delivered += 1;
                debug!(
                    key = %key,
                    waiter = waiter.id,
                    response_time_ms = response_time.as_millis(),
                    "Resolved pending search"
                );
            } else {
                // Receiver gone between removal and send
                self.stats.total_abandoned.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.stats
            .total_resolved
            .fetch_add(delivered as u64, Ordering::Relaxed);
        delivered
    }

    /// Timeout path: remove one waiter whose deadline passed.
    ///
    /// Returns false if the waiter was already gone, i.e. a reply won.
    pub fn expire(&self, key: &CorrelationKey, id: WaiterId) -> bool {
        let removed = self.remove_waiter(key, id);
        if removed {
            self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    /// Guard path: remove one waiter whose caller stopped waiting.
    pub fn abandon(&self, key: &CorrelationKey, id: WaiterId) -> bool {
        let removed = self.remove_waiter(key, id);
        if removed {
            self.stats.total_abandoned.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, waiter = id, "Pending search abandoned");
        }
        removed
    }

    fn remove_waiter(&self, key: &CorrelationKey, id: WaiterId) -> bool {
        let mut removed = false;
        // Drops the whole entry once its last waiter leaves
        self.pending.remove_if_mut(key, |_, waiters| {
            if let Some(pos) = waiters.iter().position(|w| w.id == id) {
                waiters.swap_remove(pos);
                removed = true;
            }
            waiters.is_empty()
        });
        removed
    }

    /// Record an inbound message that could not be decoded.
    pub fn record_malformed(&self) {
        self.stats.total_malformed.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of keys currently in flight
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Number of individual waiters across all keys
    pub fn waiter_count(&self) -> usize {
        self.pending.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if a key has at least one waiter
    pub fn is_pending(&self, key: &CorrelationKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Keys currently in flight (for diagnostics)
    pub fn pending_keys(&self) -> Vec<CorrelationKey> {
        self.pending.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

/// Handle held by a caller waiting on one registered search.
///
/// Dropping it before `wait` completes removes the waiter from the store.
pub struct PendingReply<'a> {
    store: &'a PendingReplyStore,
    key: CorrelationKey,
    id: WaiterId,
    receiver: oneshot::Receiver<LyricsSearchResult>,
    armed: bool,
}

impl PendingReply<'_> {
    /// Key this waiter is registered under
    pub fn key(&self) -> &CorrelationKey {
        &self.key
    }

    /// Suspend until a reply resolves this waiter or `timeout` elapses.
    ///
    /// Returns `None` on timeout. If the deadline passes while a reply is
    /// already being delivered, the reply wins and is returned.
    pub async fn wait(mut self, timeout: Duration) -> Option<LyricsSearchResult> {
        let outcome = tokio::time::timeout(timeout, &mut self.receiver).await;
        self.armed = false;

        match outcome {
            Ok(Ok(result)) => Some(result),
            Ok(Err(_)) => {
                debug!(key = %self.key, waiter = self.id, "Pending search dropped by store");
                None
            }
            Err(_) => {
                if self.store.expire(&self.key, self.id) {
                    warn!(
                        key = %self.key,
                        timeout_ms = timeout.as_millis(),
                        "Search request timed out"
                    );
                    return None;
                }
                // The listener removed this waiter first; its send is in flight
                (&mut self.receiver).await.ok()
            }
        }
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store.abandon(&self.key, self.id);
        }
    }
}
