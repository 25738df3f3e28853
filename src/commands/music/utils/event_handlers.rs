//! The songbird-backed playback backend and the track event handler that
//! reports finished tracks back to their session.

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use serenity::async_trait;
use songbird::input::HttpRequest;
use songbird::tracks::{PlayMode, TrackHandle};
use songbird::{Event, EventContext, Songbird, TrackEvent};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::playback_backend::{CompletionNotifier, PlaybackBackend, PlaybackError};

/// Event handler for when a track ends or fails.
pub struct TrackEndNotifier {
    pub notifier: CompletionNotifier,
}

#[async_trait]
impl songbird::EventHandler for TrackEndNotifier {
    async fn act(&self, ctx: &EventContext<'_>) -> Option<Event> {
        if let EventContext::Track(tracks) = ctx {
            let error = tracks.iter().find_map(|(state, _)| match &state.playing {
                PlayMode::Errored(e) => Some(PlaybackError::StreamFailure(format!("{:?}", e))),
                _ => None,
            });

            debug!("Track event for playback {}", self.notifier.token());
            self.notifier.notify(error);
        }
        None
    }
}

/// Streams locators into a guild's songbird call.
pub struct SongbirdBackend {
    manager: Arc<Songbird>,
    guild_id: serenity::GuildId,
    http: reqwest::Client,
    current: Mutex<Option<TrackHandle>>,
}

impl SongbirdBackend {
    pub fn new(manager: Arc<Songbird>, guild_id: serenity::GuildId, http: reqwest::Client) -> Self {
        Self {
            manager,
            guild_id,
            http,
            current: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PlaybackBackend for SongbirdBackend {
    async fn connect(&self, channel: serenity::ChannelId) -> Result<(), PlaybackError> {
        if let Some(call) = self.manager.get(self.guild_id) {
            if call.lock().await.current_channel().is_some() {
                return Ok(());
            }
        }

        self.manager
            .join(self.guild_id, channel)
            .await
            .map_err(|e| PlaybackError::JoinFailed(e.to_string()))?;

        info!("Joined voice channel {} in guild {}", channel, self.guild_id);
        Ok(())
    }

    async fn start_playback(
        &self,
        locator: &str,
        on_completion: CompletionNotifier,
    ) -> Result<(), PlaybackError> {
        let call = self
            .manager
            .get(self.guild_id)
            .ok_or(PlaybackError::NotConnected)?;

        let input = HttpRequest::new(self.http.clone(), locator.to_string());

        let track_handle = {
            let mut handler = call.lock().await;
            handler.play_only_input(input.into())
        };

        // End covers natural completion and stop(); Error covers stream failures.
        for event in [TrackEvent::End, TrackEvent::Error] {
            track_handle
                .add_event(
                    Event::Track(event),
                    TrackEndNotifier {
                        notifier: on_completion.clone(),
                    },
                )
                .map_err(|e| PlaybackError::StreamFailure(e.to_string()))?;
        }

        *self.current.lock().await = Some(track_handle);
        Ok(())
    }

    async fn stop_playback(&self) {
        if let Some(track) = self.current.lock().await.take() {
            if let Err(e) = track.stop() {
                // The track already finished; its End event is on the way.
                debug!("Stopping track in guild {} failed: {}", self.guild_id, e);
            }
        }
    }

    async fn disconnect(&self) {
        self.current.lock().await.take();

        if self.manager.get(self.guild_id).is_none() {
            debug!("Guild {} already left its voice channel", self.guild_id);
            return;
        }

        match self.manager.remove(self.guild_id).await {
            Ok(()) => info!("Left voice channel in guild {}", self.guild_id),
            Err(e) => warn!(
                "Failed to leave voice channel in guild {}: {}",
                self.guild_id, e
            ),
        }
    }
}
