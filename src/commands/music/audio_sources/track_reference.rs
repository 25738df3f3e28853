//! Defines `TrackReference`, the unit stored in a guild's playback queue.

use serde::{Deserialize, Serialize};

/// A track known by title, optionally already resolved to a streamable locator.
///
/// A missing `locator` means the track is resolved by title when its turn to
/// play comes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackReference {
    /// The title shown to users, or the search query for deferred tracks.
    pub title: String,
    /// Direct media address handed to the playback backend.
    pub locator: Option<String>,
}

impl TrackReference {
    pub fn resolved(title: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            locator: Some(locator.into()),
        }
    }

    pub fn deferred(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            locator: None,
        }
    }

    /// True when the reference carries a non-empty locator.
    pub fn is_playable(&self) -> bool {
        self.locator.as_deref().is_some_and(|l| !l.trim().is_empty())
    }
}
