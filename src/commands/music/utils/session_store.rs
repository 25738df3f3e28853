use dashmap::DashMap;
use serenity::model::id::GuildId;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::commands::music::audio_sources::SourceResolver;

use super::announcer::Announcer;
use super::playback_backend::PlaybackBackend;
use super::session::SessionHandle;

/// Maps each guild to its playback session. Sessions are created on first use
/// and never removed; an idle session costs one parked task.
pub struct SessionStore {
    sessions: DashMap<GuildId, SessionHandle>,
    resolver: Arc<dyn SourceResolver>,
    announcer: Arc<dyn Announcer>,
    disconnect_delay: Duration,
}

impl SessionStore {
    pub fn new(
        resolver: Arc<dyn SourceResolver>,
        announcer: Arc<dyn Announcer>,
        disconnect_delay: Duration,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            resolver,
            announcer,
            disconnect_delay,
        }
    }

    /// Returns the guild's session, spawning it with the backend produced by
    /// `backend` if this is the guild's first request.
    pub fn get_or_create<F>(&self, guild_id: GuildId, backend: F) -> SessionHandle
    where
        F: FnOnce() -> Arc<dyn PlaybackBackend>,
    {
        self.sessions
            .entry(guild_id)
            .or_insert_with(|| {
                info!("Creating playback session for guild {}", guild_id);
                SessionHandle::spawn(
                    guild_id,
                    backend(),
                    self.resolver.clone(),
                    self.announcer.clone(),
                    self.disconnect_delay,
                )
            })
            .value()
            .clone()
    }

    /// Returns the guild's session if one was ever created.
    pub fn get(&self, guild_id: GuildId) -> Option<SessionHandle> {
        self.sessions.get(&guild_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
