//! Correlation key for request/reply matching.
//!
//! A search is identified by what the caller asked for, not by a generated
//! id: the worker on the other side of the bus only ever sees the title and
//! artist, and echoes them back on the reply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between title and artist in a correlation key.
pub const KEY_SEPARATOR: char = ':';

/// Key identifying one logical in-flight search.
///
/// Built as `"<title>:<artist>"` by exact concatenation. No trimming and no
/// case folding: the worker echoes the requested identity verbatim, so a
/// reply for `"Song"` must not satisfy a wait for `"song"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationKey(String);

impl CorrelationKey {
    /// Build the key for a title/artist pair.
    pub fn new(title: &str, artist: &str) -> Self {
        let mut key = String::with_capacity(title.len() + artist.len() + 1);
        key.push_str(title);
        key.push(KEY_SEPARATOR);
        key.push_str(artist);
        Self(key)
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<CorrelationKey> for String {
    fn from(key: CorrelationKey) -> Self {
        key.0
    }
}
