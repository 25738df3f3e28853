//! Per-guild playback session: a FIFO queue plus the track currently
//! streaming. One task owns each session and applies user commands, backend
//! completions and timer fires strictly one after another, so none of them
//! can observe another half-applied.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serenity::model::id::{ChannelId, GuildId};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::commands::music::audio_sources::{ResolutionError, SourceResolver, TrackReference};

use super::announcer::{Announcement, Announcer};
use super::disconnect_timer::DisconnectTimer;
use super::playback_backend::{CompletionNotifier, PlaybackBackend, PlaybackError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing playing, nothing queued, no timer.
    Idle,
    Playing,
    /// Nothing left to play; the voice channel is released when the timer fires.
    AwaitingDisconnect,
}

/// Snapshot of a session for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub state: SessionState,
    pub current: Option<String>,
    /// Titles in play order.
    pub queue: Vec<String>,
}

/// The track currently streaming, with the token a skip must quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub token: u64,
    pub title: String,
}

/// Where a play request came from: the voice channel to play in and the text
/// channel announcements go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOrigin {
    pub voice_channel: ChannelId,
    pub text_channel: ChannelId,
}

/// What happened to a batch handed to `enqueue_and_maybe_start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Nothing was playing, so `title` started with `queued` tracks behind it.
    Started { title: String, queued: usize },
    /// Appended behind the current track; `position` is the 1-based queue
    /// slot of the first appended track.
    Queued { position: usize, count: usize },
    /// No track in the batch could be resolved and started.
    NothingPlayable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Nothing is playing")]
    NothingPlaying,

    #[error("Playback session for guild {0} has shut down")]
    Closed(GuildId),

    #[error("Could not connect: {0}")]
    Connect(PlaybackError),
}

#[derive(Error, Debug)]
enum StartError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}

/// Messages processed by the session task.
#[derive(Debug)]
pub(crate) enum SessionCommand {
    Enqueue {
        tracks: Vec<TrackReference>,
        origin: Option<RequestOrigin>,
        reply: oneshot::Sender<Result<EnqueueOutcome, SessionError>>,
    },
    TrackEnded {
        token: u64,
        error: Option<PlaybackError>,
    },
    Skip {
        token: u64,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    DisconnectTimerFired {
        token: u64,
    },
    Status {
        reply: oneshot::Sender<SessionStatus>,
    },
    NowPlaying {
        reply: oneshot::Sender<Option<NowPlaying>>,
    },
}

#[derive(Debug)]
struct CurrentTrack {
    title: String,
    locator: String,
    /// Matches the token of the completion that ends this track.
    token: u64,
}

struct PlaybackSession {
    guild_id: GuildId,
    queue: VecDeque<TrackReference>,
    current: Option<CurrentTrack>,
    disconnect_timer: Option<DisconnectTimer>,
    disconnect_delay: Duration,
    backend: Arc<dyn PlaybackBackend>,
    resolver: Arc<dyn SourceResolver>,
    announcer: Arc<dyn Announcer>,
    /// Text channel of the most recent play request.
    announce_to: Option<ChannelId>,
    commands: mpsc::UnboundedSender<SessionCommand>,
    last_token: u64,
}

impl PlaybackSession {
    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<SessionCommand>) {
        debug!("Playback session started for guild {}", self.guild_id);

        while let Some(command) = inbox.recv().await {
            self.handle(command).await;
        }
    }

    async fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Enqueue {
                tracks,
                origin,
                reply,
            } => {
                let outcome = self.enqueue_and_maybe_start(tracks, origin).await;
                let _ = reply.send(outcome);
            }
            SessionCommand::TrackEnded { token, error } => self.on_track_ended(token, error).await,
            SessionCommand::Skip { token, reply } => {
                let result = self.skip(token).await;
                let _ = reply.send(result);
            }
            SessionCommand::Stop { reply } => {
                self.stop().await;
                let _ = reply.send(());
            }
            SessionCommand::DisconnectTimerFired { token } => self.on_disconnect_timer(token).await,
            SessionCommand::Status { reply } => {
                let _ = reply.send(self.status());
            }
            SessionCommand::NowPlaying { reply } => {
                let _ = reply.send(self.now_playing());
            }
        }
    }

    fn next_token(&mut self) -> u64 {
        self.last_token += 1;
        self.last_token
    }

    fn state(&self) -> SessionState {
        if self.current.is_some() {
            SessionState::Playing
        } else if self.disconnect_timer.is_some() {
            SessionState::AwaitingDisconnect
        } else {
            SessionState::Idle
        }
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state(),
            current: self.current.as_ref().map(|c| c.title.clone()),
            queue: self.queue.iter().map(|t| t.title.clone()).collect(),
        }
    }

    fn now_playing(&self) -> Option<NowPlaying> {
        self.current.as_ref().map(|c| NowPlaying {
            token: c.token,
            title: c.title.clone(),
        })
    }

    async fn enqueue_and_maybe_start(
        &mut self,
        tracks: Vec<TrackReference>,
        origin: Option<RequestOrigin>,
    ) -> Result<EnqueueOutcome, SessionError> {
        if let Some(origin) = origin {
            self.announce_to = Some(origin.text_channel);
        }

        let count = tracks.len();

        if self.current.is_some() || count == 0 {
            let position = self.queue.len() + 1;
            self.queue.extend(tracks);
            debug!(
                "Queued {} tracks at position {} in guild {}",
                count, position, self.guild_id
            );
            return Ok(EnqueueOutcome::Queued { position, count });
        }

        // The disconnect timer may already have released the call.
        if let Some(origin) = origin {
            self.backend
                .connect(origin.voice_channel)
                .await
                .map_err(SessionError::Connect)?;
        }

        self.cancel_disconnect_timer();
        self.queue.extend(tracks);

        Ok(match self.play_next(false).await {
            Some(title) => EnqueueOutcome::Started {
                title,
                queued: self.queue.len(),
            },
            None => EnqueueOutcome::NothingPlayable,
        })
    }

    fn announce(&self, announcement: Announcement) {
        if let Some(channel) = self.announce_to {
            self.announcer.announce(channel, announcement);
        }
    }

    /// Starts the first queued track that resolves and starts, dropping the
    /// ones that don't. Each entry is tried at most once. Arms the disconnect
    /// timer when the queue runs out.
    ///
    /// With `announce` set, the new track and every dropped one are posted to
    /// the request channel; command-driven starts are reported by the reply.
    async fn play_next(&mut self, announce: bool) -> Option<String> {
        while let Some(track) = self.queue.pop_front() {
            let title = track.title.clone();
            match self.start(track).await {
                Ok(title) => {
                    if announce {
                        self.announce(Announcement::NowPlaying {
                            title: title.clone(),
                        });
                    }
                    return Some(title);
                }
                Err(e) => {
                    warn!("Skipping `{}` in guild {}: {}", title, self.guild_id, e);
                    if announce {
                        self.announce(Announcement::Unplayable { title });
                    }
                }
            }
        }

        info!("Queue drained for guild {}", self.guild_id);
        self.arm_disconnect_timer();
        None
    }

    async fn start(&mut self, track: TrackReference) -> Result<String, StartError> {
        let TrackReference { title, locator } = if track.is_playable() {
            track
        } else {
            debug!("Resolving deferred track `{}`", track.title);
            self.resolver.resolve(&track.title).await?
        };

        let Some(locator) = locator else {
            return Err(ResolutionError::NoPlayableEntry(title).into());
        };

        let token = self.next_token();
        let notifier = CompletionNotifier::new(token, self.commands.clone());
        self.backend.start_playback(&locator, notifier).await?;

        info!("Now playing `{}` in guild {}", title, self.guild_id);
        debug!("Playback {} streams {}", token, locator);
        self.current = Some(CurrentTrack {
            title: title.clone(),
            locator,
            token,
        });

        Ok(title)
    }

    async fn on_track_ended(&mut self, token: u64, error: Option<PlaybackError>) {
        if !self.current.as_ref().is_some_and(|c| c.token == token) {
            debug!(
                "Ignoring stale completion {} in guild {}",
                token, self.guild_id
            );
            return;
        }

        if let Some(finished) = self.current.take() {
            match error {
                Some(e) => warn!(
                    "`{}` ended with an error in guild {}: {}",
                    finished.title, self.guild_id, e
                ),
                None => info!("Finished `{}` in guild {}", finished.title, self.guild_id),
            }
        }

        self.play_next(true).await;
    }

    async fn skip(&mut self, token: u64) -> Result<(), SessionError> {
        let Some(current) = &self.current else {
            return Err(SessionError::NothingPlaying);
        };

        if current.token != token {
            debug!(
                "Playback {} already ended in guild {}; ignoring skip",
                token, self.guild_id
            );
            return Ok(());
        }

        info!("Skipping `{}` in guild {}", current.title, self.guild_id);
        // The backend reports the stopped track as ended, which advances the queue.
        self.backend.stop_playback().await;
        Ok(())
    }

    async fn stop(&mut self) {
        self.queue.clear();
        self.cancel_disconnect_timer();

        if let Some(current) = self.current.take() {
            debug!("Stopping `{}` ({})", current.title, current.locator);
            self.backend.stop_playback().await;
        }

        self.backend.disconnect().await;
        info!("Stopped playback in guild {}", self.guild_id);
    }

    fn arm_disconnect_timer(&mut self) {
        self.cancel_disconnect_timer();

        let token = self.next_token();
        debug!(
            "Arming disconnect timer {} ({:?}) for guild {}",
            token, self.disconnect_delay, self.guild_id
        );
        self.disconnect_timer = Some(DisconnectTimer::arm(
            token,
            self.disconnect_delay,
            self.commands.clone(),
        ));
    }

    fn cancel_disconnect_timer(&mut self) {
        if let Some(timer) = self.disconnect_timer.take() {
            debug!(
                "Canceling disconnect timer {} for guild {}",
                timer.token(),
                self.guild_id
            );
            timer.cancel();
        }
    }

    async fn on_disconnect_timer(&mut self, token: u64) {
        let armed = self
            .disconnect_timer
            .as_ref()
            .is_some_and(|t| t.token() == token);

        if !armed || self.state() != SessionState::AwaitingDisconnect || !self.queue.is_empty() {
            debug!("Ignoring stale disconnect timer {}", token);
            return;
        }

        self.disconnect_timer = None;
        info!(
            "Leaving voice channel in guild {} after {:?} without music",
            self.guild_id, self.disconnect_delay
        );
        self.backend.disconnect().await;
    }
}

/// Cheap, cloneable handle to a running playback session.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    guild_id: GuildId,
    commands: mpsc::UnboundedSender<SessionCommand>,
    origin: Option<RequestOrigin>,
}

impl SessionHandle {
    /// Spawns the task owning a new, idle session.
    pub fn spawn(
        guild_id: GuildId,
        backend: Arc<dyn PlaybackBackend>,
        resolver: Arc<dyn SourceResolver>,
        announcer: Arc<dyn Announcer>,
        disconnect_delay: Duration,
    ) -> Self {
        let (commands, inbox) = mpsc::unbounded_channel();

        let session = PlaybackSession {
            guild_id,
            queue: VecDeque::new(),
            current: None,
            disconnect_timer: None,
            disconnect_delay,
            backend,
            resolver,
            announcer,
            announce_to: None,
            commands: commands.clone(),
            last_token: 0,
        };
        tokio::spawn(session.run(inbox));

        Self {
            guild_id,
            commands,
            origin: None,
        }
    }

    /// A handle whose enqueues (re)join `voice_channel` before starting and
    /// direct announcements to `text_channel`.
    pub fn for_request(mut self, voice_channel: ChannelId, text_channel: ChannelId) -> Self {
        self.origin = Some(RequestOrigin {
            voice_channel,
            text_channel,
        });
        self
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();

        self.commands
            .send(build(reply))
            .map_err(|_| SessionError::Closed(self.guild_id))?;

        response.await.map_err(|_| SessionError::Closed(self.guild_id))
    }

    /// Starts the first track if the session is idle and queues the rest;
    /// otherwise queues them all behind the current track.
    pub async fn enqueue_and_maybe_start(
        &self,
        tracks: Vec<TrackReference>,
    ) -> Result<EnqueueOutcome, SessionError> {
        let origin = self.origin;
        self.request(|reply| SessionCommand::Enqueue {
            tracks,
            origin,
            reply,
        })
        .await?
    }

    pub async fn now_playing(&self) -> Result<Option<NowPlaying>, SessionError> {
        self.request(|reply| SessionCommand::NowPlaying { reply })
            .await
    }

    /// Ends playback `token` early. The queue advances when the backend
    /// reports the track as ended. A token that is no longer current means
    /// the track already ended on its own, and the skip does nothing.
    pub async fn skip(&self, token: u64) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Skip { token, reply })
            .await?
    }

    /// Clears everything and leaves the voice channel. Valid in any state.
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionCommand::Stop { reply }).await
    }

    pub async fn status(&self) -> Result<SessionStatus, SessionError> {
        self.request(|reply| SessionCommand::Status { reply }).await
    }
}
