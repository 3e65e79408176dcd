//! In-process stand-in for the lyrics search worker.
//!
//! Subscribes to the request channel, looks the song up in a fixed catalog
//! (case-insensitively, the way a search provider would) and publishes the
//! catalog's canonical entry on the result channel. Unknown songs get no
//! reply at all.

use lyrics_bridge::domain::config::DEFAULT_RESULT_CHANNEL;
use lyrics_bridge::ipc::SearchRequestMessage;
use lyrics_bus::{InMemoryMessageBus, MessagePublisher};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Canonical song data the worker answers with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub title: String,
    pub artist: String,
    pub lyrics: Option<String>,
    pub url: Option<String>,
    pub album: Option<String>,
    pub release_date: Option<String>,
}

impl CatalogEntry {
    pub fn new(title: &str, artist: &str, lyrics: &str) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            lyrics: Some(lyrics.to_string()),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct WorkerReply<'a> {
    #[serde(flatten)]
    entry: &'a CatalogEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_artist: Option<&'a str>,
}

fn lookup_key(title: &str, artist: &str) -> (String, String) {
    (title.to_lowercase(), artist.to_lowercase())
}

/// Fake search worker.
pub struct FakeSearchWorker {
    catalog: HashMap<(String, String), CatalogEntry>,
    echo_request: bool,
    delay: Duration,
    result_channel: String,
}

impl Default for FakeSearchWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSearchWorker {
    pub fn new() -> Self {
        Self {
            catalog: HashMap::new(),
            echo_request: true,
            delay: Duration::ZERO,
            result_channel: DEFAULT_RESULT_CHANNEL.to_string(),
        }
    }

    /// Answer searches for `entry`'s title and artist, in any letter case.
    pub fn with_song(mut self, entry: CatalogEntry) -> Self {
        self.catalog
            .insert(lookup_key(&entry.title, &entry.artist), entry);
        self
    }

    /// Leave `request_title`/`request_artist` out of replies.
    pub fn without_echo(mut self) -> Self {
        self.echo_request = false;
        self
    }

    /// Wait this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Subscribe to `request_channel` now and serve requests in a
    /// background task until the returned handle is dropped.
    pub fn spawn(self, bus: Arc<InMemoryMessageBus>, request_channel: &str) -> WorkerHandle {
        let mut requests = bus.subscribe(request_channel);
        let replies = Arc::new(AtomicUsize::new(0));
        let sent = Arc::clone(&replies);

        let task = tokio::spawn(async move {
            while let Some(message) = requests.recv().await {
                let request: SearchRequestMessage = match serde_json::from_slice(message.payload()) {
                    Ok(request) => request,
                    Err(e) => {
                        warn!(error = %e, "Worker ignoring malformed request");
                        continue;
                    }
                };

                let Some(entry) = self
                    .catalog
                    .get(&lookup_key(&request.title, &request.artist))
                else {
                    debug!(title = %request.title, artist = %request.artist, "Worker found nothing");
                    continue;
                };

                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }

                let reply = WorkerReply {
                    entry,
                    request_title: self.echo_request.then_some(request.title.as_str()),
                    request_artist: self.echo_request.then_some(request.artist.as_str()),
                };
                let payload = match serde_json::to_vec(&reply) {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn!(error = %e, "Worker failed to encode reply");
                        continue;
                    }
                };

                bus.publish(&self.result_channel, payload).await;
                sent.fetch_add(1, Ordering::SeqCst);
            }
        });

        WorkerHandle { replies, task }
    }
}

/// Running fake worker; stops when dropped.
pub struct WorkerHandle {
    replies: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Replies published so far
    pub fn replies(&self) -> usize {
        self.replies.load(Ordering::SeqCst)
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
