//! Turns a `play` query into track references and hands them to a session:
//! a single search for plain queries, or a catalog expansion where only the
//! first track is resolved up front and the rest are resolved when their
//! turn comes.

use tracing::{info, warn};

use crate::commands::music::audio_sources::{
    CatalogError, CatalogExpander, ResolutionError, SourceResolver, TrackReference,
    spotify::is_spotify_link,
};

use super::music_manager::{MusicError, MusicResult};
use super::session::{EnqueueOutcome, SessionHandle};

/// Result of enqueueing an expanded catalog link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Tracks the catalog returned.
    pub total: usize,
    /// Set when the eagerly resolved first track failed and was left out.
    pub dropped_first: Option<ResolutionError>,
    pub enqueue: EnqueueOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Single {
        track: TrackReference,
        enqueue: EnqueueOutcome,
    },
    Batch(BatchOutcome),
}

/// Resolves a single query and enqueues it.
pub async fn enqueue_query(
    session: &SessionHandle,
    resolver: &dyn SourceResolver,
    query: &str,
) -> MusicResult<PlayOutcome> {
    let track = resolver.resolve(query).await?;
    info!("Resolved `{}` to `{}`", query, track.title);

    let enqueue = session.enqueue_and_maybe_start(vec![track.clone()]).await?;
    Ok(PlayOutcome::Single { track, enqueue })
}

/// Expands a catalog link and enqueues every track in catalog order. Only
/// the first query is resolved here; the others are queued unresolved.
pub async fn enqueue_catalog(
    session: &SessionHandle,
    catalog: &dyn CatalogExpander,
    resolver: &dyn SourceResolver,
    reference: &str,
) -> MusicResult<BatchOutcome> {
    let queries = catalog.expand(reference).await?;
    let total = queries.len();
    let mut queries = queries.into_iter();

    let Some(first_query) = queries.next() else {
        return Err(CatalogError::EmptyCollection.into());
    };

    let mut tracks = Vec::with_capacity(total);
    let mut dropped_first = None;

    match resolver.resolve(&first_query).await {
        Ok(first) => tracks.push(first),
        Err(e) if total == 1 => return Err(e.into()),
        Err(e) => {
            warn!("Leaving out `{}` from {}: {}", first_query, reference, e);
            dropped_first = Some(e);
        }
    }

    tracks.extend(queries.map(TrackReference::deferred));
    info!("Enqueueing {} tracks from {}", tracks.len(), reference);

    let enqueue = session.enqueue_and_maybe_start(tracks).await?;
    Ok(BatchOutcome {
        total,
        dropped_first,
        enqueue,
    })
}

/// Routes a `play` query to catalog expansion or plain search.
pub async fn enqueue_play_request(
    session: &SessionHandle,
    resolver: &dyn SourceResolver,
    catalog: Option<&dyn CatalogExpander>,
    query: &str,
) -> MusicResult<PlayOutcome> {
    match catalog {
        Some(catalog) if catalog.handles(query) => {
            enqueue_catalog(session, catalog, resolver, query)
                .await
                .map(PlayOutcome::Batch)
        }
        None if is_spotify_link(query) => Err(MusicError::CatalogUnavailable),
        _ => enqueue_query(session, resolver, query).await,
    }
}
