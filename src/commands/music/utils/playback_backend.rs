//! The seam between a playback session and whatever actually streams audio.

use serenity::async_trait;
use serenity::model::id::ChannelId;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use super::session::SessionCommand;

/// Errors reported by a playback backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Stream failed: {0}")]
    StreamFailure(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to join voice channel: {0}")]
    JoinFailed(String),
}

/// A voice connection able to stream one source at a time.
#[async_trait]
pub trait PlaybackBackend: Send + Sync {
    /// Join `channel` unless already connected to a voice channel.
    async fn connect(&self, channel: ChannelId) -> Result<(), PlaybackError>;

    /// Start streaming `locator`, replacing anything already playing.
    /// `on_completion` must be notified when the stream finishes or fails.
    async fn start_playback(
        &self,
        locator: &str,
        on_completion: CompletionNotifier,
    ) -> Result<(), PlaybackError>;

    /// Stop the current stream early. The stream's completion is still reported.
    async fn stop_playback(&self);

    /// Release the voice connection. Calling this when already released is a no-op.
    async fn disconnect(&self);
}

/// Hands a track's completion back to the session that started it.
///
/// Notifying only queues a message; the session applies it in order with
/// every other command, so this is safe to call from any thread.
#[derive(Clone, Debug)]
pub struct CompletionNotifier {
    token: u64,
    commands: UnboundedSender<SessionCommand>,
}

impl CompletionNotifier {
    pub(crate) fn new(token: u64, commands: UnboundedSender<SessionCommand>) -> Self {
        Self { token, commands }
    }

    /// Identifies the playback this notifier belongs to.
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn notify(&self, error: Option<PlaybackError>) {
        let message = SessionCommand::TrackEnded {
            token: self.token,
            error,
        };

        if self.commands.send(message).is_err() {
            debug!("Session closed before track {} completed", self.token);
        }
    }
}
