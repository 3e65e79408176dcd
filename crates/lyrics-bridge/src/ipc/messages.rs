//! Wire messages exchanged with the search worker.
//!
//! Outbound on the request channel:
//!
//! ```json
//! { "title": "Song X", "artist": "Artist Y" }
//! ```
//!
//! Inbound on the result channel:
//!
//! ```json
//! {
//!   "title": "Song X", "artist": "Artist Y",
//!   "lyrics": "...", "url": "...", "album": "...", "release_date": "...",
//!   "request_title": "song x", "request_artist": "artist y"
//! }
//! ```

use crate::domain::correlation::CorrelationKey;
use crate::domain::types::{LyricsSearchResult, SearchRequest};
use serde::{Deserialize, Deserializer, Serialize};

/// Search request as published on the request channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequestMessage {
    pub title: String,
    pub artist: String,
}

impl From<&SearchRequest> for SearchRequestMessage {
    fn from(request: &SearchRequest) -> Self {
        Self {
            title: request.title().to_string(),
            artist: request.artist().to_string(),
        }
    }
}

impl SearchRequestMessage {
    /// Serialize to the JSON payload published on the wire.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Optional string field: anything other than a JSON string reads as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => Ok(Some(value)),
        _ => Ok(None),
    }
}

/// Search reply as received on the result channel.
///
/// `title` and `artist` are required strings; every other field may be
/// absent, null or of the wrong type, and then reads as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMessage {
    pub title: String,
    pub artist: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub lyrics: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub album: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub release_date: Option<String>,
    /// Title as originally requested, echoed by the worker
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_title: Option<String>,
    /// Artist as originally requested, echoed by the worker
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_artist: Option<String>,
}

impl ReplyMessage {
    /// Decode a raw inbound payload.
    pub fn decode(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }

    /// Key of the request this reply answers.
    ///
    /// The echoed request identity takes precedence over the provider's
    /// (possibly canonicalized) title and artist, field by field.
    pub fn correlation_key(&self) -> CorrelationKey {
        let title = self.request_title.as_deref().unwrap_or(&self.title);
        let artist = self.request_artist.as_deref().unwrap_or(&self.artist);
        CorrelationKey::new(title, artist)
    }

    /// Convert into the result handed to waiting callers.
    pub fn into_result(self) -> LyricsSearchResult {
        LyricsSearchResult {
            title: self.title,
            artist: self.artist,
            lyrics: self.lyrics,
            url: self.url,
            album: self.album,
            release_date: self.release_date,
        }
    }
}
