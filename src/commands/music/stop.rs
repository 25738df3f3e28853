use super::*;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::{MusicError, MusicManager},
};

/// Stop the music, clear the queue, and leave the voice channel
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn stop(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    let session = MusicManager::session(ctx.serenity_context(), ctx.data(), guild_id).await?;
    session.stop().await?;

    ctx.send(embedded_messages::stopped()).await?;

    Ok(())
}
