//! Domain types: the search identity a caller asks for and the result it
//! gets back.

use crate::domain::correlation::CorrelationKey;
use crate::domain::error::BridgeError;
use serde::{Deserialize, Serialize};

/// Identity of a lyrics search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchRequest {
    title: String,
    artist: String,
}

impl SearchRequest {
    /// Create a request, rejecting an empty title or artist.
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Result<Self, BridgeError> {
        let title = title.into();
        let artist = artist.into();
        if title.is_empty() {
            return Err(BridgeError::InvalidRequest("title cannot be empty".into()));
        }
        if artist.is_empty() {
            return Err(BridgeError::InvalidRequest("artist cannot be empty".into()));
        }
        Ok(Self { title, artist })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Key under which this request's waiter is registered.
    pub fn correlation_key(&self) -> CorrelationKey {
        CorrelationKey::new(&self.title, &self.artist)
    }
}

/// A matched lyrics search result.
///
/// `title` and `artist` are the values the search provider returned, which
/// may be canonicalized and differ from the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsSearchResult {
    pub title: String,
    pub artist: String,
    pub lyrics: Option<String>,
    pub url: Option<String>,
    pub album: Option<String>,
    pub release_date: Option<String>,
}

impl LyricsSearchResult {
    /// Whether the provider returned non-blank lyrics.
    pub fn has_lyrics(&self) -> bool {
        self.lyrics
            .as_deref()
            .is_some_and(|lyrics| !lyrics.trim().is_empty())
    }
}
