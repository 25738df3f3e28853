//! This module defines the leaf services a playback session calls into:
//! `SourceResolver` turns a text query into a streamable track and
//! `CatalogExpander` turns a catalog link into an ordered list of queries.

/// Submodule implementing `CatalogExpander` for Spotify links.
pub mod spotify;
/// Submodule defining the `TrackReference` struct queued by sessions.
pub mod track_reference;
/// Submodule implementing `SourceResolver` on top of `yt-dlp` search.
pub mod youtube;

use serenity::async_trait;
use thiserror::Error;
use url::Url;

pub use track_reference::TrackReference;

/// Reasons a query could not be turned into a playable track.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("No results found for `{0}`")]
    NoResults(String),

    #[error("No playable entry in the top results for `{0}`")]
    NoPlayableEntry(String),

    #[error("Search backend failed: {0}")]
    BackendFailure(String),
}

/// Reasons a catalog link could not be expanded into queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Not a recognised catalog link: {0}")]
    InvalidReference(String),

    #[error("The collection has no tracks")]
    EmptyCollection,

    #[error("Catalog backend failed: {0}")]
    BackendFailure(String),
}

/// Finds streamable sources for a text query.
#[async_trait]
pub trait SourceResolver: Send + Sync {
    /// Returns candidates ranked by relevance, playable or not.
    async fn search(&self, query: &str) -> Result<Vec<TrackReference>, ResolutionError>;

    /// Returns the best-ranked candidate that can actually be streamed.
    async fn resolve(&self, query: &str) -> Result<TrackReference, ResolutionError> {
        let candidates = self.search(query).await?;
        first_playable(query, candidates)
    }
}

/// Expands a catalog link into one search query per track, in catalog order.
#[async_trait]
pub trait CatalogExpander: Send + Sync {
    /// Checks whether the given input is a link this catalog understands.
    fn handles(&self, reference: &str) -> bool;

    /// Either the complete ordered list of queries, or an error.
    async fn expand(&self, reference: &str) -> Result<Vec<String>, CatalogError>;
}

/// Picks the first candidate with a locator. Placeholder entries (livestreams,
/// blocked uploads) are skipped, and the chosen entry supplies both the title
/// and the locator.
pub fn first_playable(
    query: &str,
    candidates: Vec<TrackReference>,
) -> Result<TrackReference, ResolutionError> {
    if candidates.is_empty() {
        return Err(ResolutionError::NoResults(query.to_string()));
    }

    candidates
        .into_iter()
        .find(TrackReference::is_playable)
        .ok_or_else(|| ResolutionError::NoPlayableEntry(query.to_string()))
}

/// A utility struct providing general helper functions related to audio sources.
pub struct AudioSource;

impl AudioSource {
    /// Performs a basic check if the input string is an http(s) URL.
    /// Does not validate if the URL is actually reachable or supported.
    pub fn is_url(input: &str) -> bool {
        Url::parse(input).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
    }
}
