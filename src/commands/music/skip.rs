use super::*;
use crate::commands::music::utils::{
    embedded_messages, music_manager::MusicError, session::SessionError,
};

/// Skip the currently playing song
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn skip(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    let Some(session) = ctx.data().sessions.get(guild_id) else {
        ctx.send(embedded_messages::nothing_playing()).await?;
        return Ok(());
    };

    let Some(now_playing) = session.now_playing().await? else {
        ctx.send(embedded_messages::nothing_playing()).await?;
        return Ok(());
    };

    match session.skip(now_playing.token).await {
        Ok(()) => {
            ctx.send(embedded_messages::skipped()).await?;
        }
        Err(SessionError::NothingPlaying) => {
            ctx.send(embedded_messages::nothing_playing()).await?;
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
