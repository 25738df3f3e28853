use super::*;
use crate::commands::music::utils::{
    embedded_messages,
    music_manager::MusicError,
    session::{SessionState, SessionStatus},
};

/// Show the current track and what plays next
#[poise::command(slash_command, prefix_command, guild_only, category = "Music")]
pub async fn queue(ctx: Context<'_>) -> CommandResult {
    let guild_id = ctx.guild_id().ok_or(MusicError::NotInGuild)?;

    let status = match ctx.data().sessions.get(guild_id) {
        Some(session) => session.status().await?,
        None => SessionStatus {
            state: SessionState::Idle,
            current: None,
            queue: Vec::new(),
        },
    };

    ctx.send(embedded_messages::queue_status(&status)).await?;

    Ok(())
}
