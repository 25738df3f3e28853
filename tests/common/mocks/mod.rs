//! Stand-ins for the external collaborators of a playback session.

use async_trait::async_trait;
use mockall::mock;
use rusty_dj::commands::music::audio_sources::{
    CatalogError, CatalogExpander, ResolutionError, SourceResolver, TrackReference,
};
use rusty_dj::commands::music::utils::announcer::{Announcement, Announcer};
use rusty_dj::commands::music::utils::playback_backend::{
    CompletionNotifier, PlaybackBackend, PlaybackError,
};
use serenity::model::id::ChannelId;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Locators with this prefix are refused by `FakeBackend::start_playback`.
pub const BROKEN_LOCATOR_PREFIX: &str = "broken://";

/// Records what a session asks of its voice connection. Like songbird, it
/// reports a stopped track as ended and cannot play once disconnected.
pub struct FakeBackend {
    connected: AtomicBool,
    joins: Mutex<Vec<ChannelId>>,
    started: Mutex<Vec<String>>,
    notifier: Mutex<Option<CompletionNotifier>>,
    stops: AtomicUsize,
    disconnects: AtomicUsize,
}

impl Default for FakeBackend {
    /// Starts out connected, as if a `join` already ran.
    fn default() -> Self {
        Self {
            connected: AtomicBool::new(true),
            joins: Mutex::default(),
            started: Mutex::default(),
            notifier: Mutex::default(),
            stops: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }
}

impl FakeBackend {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Channels joined through `connect` while disconnected.
    pub fn joins(&self) -> Vec<ChannelId> {
        self.joins.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// A copy of the notifier for the track currently streaming.
    pub fn current_notifier(&self) -> Option<CompletionNotifier> {
        self.notifier.lock().unwrap().clone()
    }

    /// Simulates the current stream running out (or failing).
    pub fn finish_current(&self, error: Option<PlaybackError>) {
        let notifier = self.notifier.lock().unwrap().take();
        if let Some(notifier) = notifier {
            notifier.notify(error);
        }
    }
}

#[async_trait]
impl PlaybackBackend for FakeBackend {
    async fn connect(&self, channel: ChannelId) -> Result<(), PlaybackError> {
        if !self.connected.swap(true, Ordering::SeqCst) {
            self.joins.lock().unwrap().push(channel);
        }
        Ok(())
    }

    async fn start_playback(
        &self,
        locator: &str,
        on_completion: CompletionNotifier,
    ) -> Result<(), PlaybackError> {
        if !self.is_connected() {
            return Err(PlaybackError::NotConnected);
        }

        if locator.starts_with(BROKEN_LOCATOR_PREFIX) {
            return Err(PlaybackError::StreamFailure(format!("cannot open {}", locator)));
        }

        self.started.lock().unwrap().push(locator.to_string());
        *self.notifier.lock().unwrap() = Some(on_completion);
        Ok(())
    }

    async fn stop_playback(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.finish_current(None);
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Keeps every announcement a session makes, with its target channel.
#[derive(Default)]
pub struct RecordingAnnouncer {
    posted: Mutex<Vec<(ChannelId, Announcement)>>,
}

impl RecordingAnnouncer {
    pub fn posted(&self) -> Vec<(ChannelId, Announcement)> {
        self.posted.lock().unwrap().clone()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, channel: ChannelId, announcement: Announcement) {
        self.posted.lock().unwrap().push((channel, announcement));
    }
}

/// Answers queries from a fixed table; unknown queries have no results.
#[derive(Default)]
pub struct FakeResolver {
    answers: HashMap<String, Result<TrackReference, ResolutionError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(mut self, query: &str, title: &str, locator: &str) -> Self {
        self.answers.insert(
            query.to_string(),
            Ok(TrackReference::resolved(title, locator)),
        );
        self
    }

    pub fn with_failure(mut self, query: &str, error: ResolutionError) -> Self {
        self.answers.insert(query.to_string(), Err(error));
        self
    }

    /// Every query searched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourceResolver for FakeResolver {
    async fn search(&self, query: &str) -> Result<Vec<TrackReference>, ResolutionError> {
        self.calls.lock().unwrap().push(query.to_string());

        match self.answers.get(query) {
            Some(Ok(track)) => Ok(vec![track.clone()]),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(vec![]),
        }
    }
}

mock! {
    pub Catalog {}

    #[async_trait]
    impl CatalogExpander for Catalog {
        fn handles(&self, reference: &str) -> bool;
        async fn expand(&self, reference: &str) -> Result<Vec<String>, CatalogError>;
    }
}
