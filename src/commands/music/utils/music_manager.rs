use poise::serenity_prelude as serenity;
use serenity::client::Context;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::Mutex as SerenityMutex;
use songbird::{Call, Songbird};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::commands::music::audio_sources::{CatalogError, ResolutionError};
use crate::{Data, HTTP_CLIENT};

use super::event_handlers::SongbirdBackend;
use super::playback_backend::PlaybackBackend;
use super::session::{SessionError, SessionHandle};

/// Errors that can occur during music operations
#[derive(Error, Debug)]
pub enum MusicError {
    #[error("Not in a guild")]
    NotInGuild,

    #[error("Failed to join voice channel: {0}")]
    JoinError(String),

    #[error("Not connected to a voice channel")]
    NotConnected,

    #[error("Failed to get voice manager")]
    NoVoiceManager,

    #[error("User is not in a voice channel")]
    UserNotInVoiceChannel,

    #[error("Catalog links are not supported: no catalog credentials configured")]
    CatalogUnavailable,

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Result type for music operations
pub type MusicResult<T> = Result<T, MusicError>;

/// Voice-connection helpers shared by the music commands.
pub struct MusicManager;

impl MusicManager {
    /// Get the Songbird voice client from the context
    pub async fn get_songbird(ctx: &Context) -> MusicResult<Arc<Songbird>> {
        songbird::get(ctx).await.ok_or(MusicError::NoVoiceManager)
    }

    /// Get the current voice channel call handle
    pub async fn get_call(
        ctx: &Context,
        guild_id: GuildId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let songbird = Self::get_songbird(ctx).await?;
        songbird.get(guild_id).ok_or(MusicError::NotConnected)
    }

    /// Join a voice channel
    pub async fn join_channel(
        ctx: &Context,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        let songbird = Self::get_songbird(ctx).await?;

        let handle = songbird.join(guild_id, channel_id).await.map_err(|e| {
            error!(
                "Failed to join voice channel {} for guild {}: {}",
                channel_id, guild_id, e
            );
            MusicError::JoinError(e.to_string())
        })?;

        info!("Joined voice channel {} in guild {}", channel_id, guild_id);
        Ok(handle)
    }

    /// Join the user's voice channel unless a call already exists for the guild.
    pub async fn ensure_connected(
        ctx: &Context,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> MusicResult<Arc<SerenityMutex<Call>>> {
        match Self::get_call(ctx, guild_id).await {
            Ok(call) => Ok(call),
            Err(MusicError::NotConnected) => Self::join_channel(ctx, guild_id, channel_id).await,
            Err(e) => Err(e),
        }
    }

    /// Get the voice channel ID that the user is currently in
    pub fn get_user_voice_channel(
        ctx: &Context,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MusicResult<ChannelId> {
        let guild = ctx.cache.guild(guild_id).ok_or(MusicError::NotInGuild)?;

        guild
            .voice_states
            .get(&user_id)
            .and_then(|voice_state| voice_state.channel_id)
            .ok_or(MusicError::UserNotInVoiceChannel)
    }

    /// The guild's playback session, created with a songbird backend on first use.
    pub async fn session(ctx: &Context, data: &Data, guild_id: GuildId) -> MusicResult<SessionHandle> {
        if let Some(session) = data.sessions.get(guild_id) {
            return Ok(session);
        }

        let songbird = Self::get_songbird(ctx).await?;
        Ok(data.sessions.get_or_create(guild_id, || {
            let backend: Arc<dyn PlaybackBackend> =
                Arc::new(SongbirdBackend::new(songbird, guild_id, HTTP_CLIENT.clone()));
            backend
        }))
    }
}
