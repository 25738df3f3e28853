use super::*;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::{MusicError, MusicManager},
    queue_manager::enqueue_play_request,
};
use tracing::{error, info};

/// Play a song from YouTube, a direct link, or a Spotify track, playlist or album
#[poise::command(
    slash_command,
    prefix_command,
    aliases("p"),
    guild_only,
    category = "Music"
)]
pub async fn play(
    ctx: Context<'_>,
    #[description = "URL or search query"]
    #[rest]
    query: String,
) -> CommandResult {
    info!("Received play command with query: {}", query);
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    // Get the user's voice channel
    let channel_id =
        match MusicManager::get_user_voice_channel(ctx.serenity_context(), guild_id, ctx.author().id) {
            Ok(channel_id) => channel_id,
            Err(_) => {
                ctx.send(embedded_messages::user_not_in_voice_channel())
                    .await?;
                return Ok(());
            }
        };

    // Searching and catalog lookups can take a while
    ctx.defer().await?;

    // The session (re)joins the voice channel when it starts playing.
    let data = ctx.data();
    let session = MusicManager::session(ctx.serenity_context(), data, guild_id)
        .await?
        .for_request(channel_id, ctx.channel_id());

    match enqueue_play_request(
        &session,
        data.resolver.as_ref(),
        data.catalog.as_deref(),
        &query,
    )
    .await
    {
        Ok(outcome) => {
            ctx.send(embedded_messages::play_outcome(&outcome)).await?;
        }
        Err(err) => {
            error!("Failed to play `{}` in guild {}: {}", query, guild_id, err);
            ctx.send(embedded_messages::music_error(&err)).await?;
        }
    }

    Ok(())
}
