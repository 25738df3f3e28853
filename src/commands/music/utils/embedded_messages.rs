use poise::{CreateReply, serenity_prelude as serenity};
use serenity::all::{ChannelId, CreateEmbed};

use crate::commands::music::audio_sources::ResolutionError;

use super::announcer::Announcement;
use super::music_manager::MusicError;
use super::queue_manager::{BatchOutcome, PlayOutcome};
use super::session::{EnqueueOutcome, SessionStatus};

const OK_COLOR: u32 = 0x00ff00;
const ERROR_COLOR: u32 = 0xff0000;

fn error_reply(description: impl Into<String>) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("❌ Error")
            .description(description)
            .color(ERROR_COLOR),
    )
}

/// The user-facing text for a failed music request.
pub fn describe_error(err: &MusicError) -> String {
    match err {
        MusicError::Resolution(ResolutionError::NoResults(_)) => {
            "No YouTube results for that query.".to_string()
        }
        MusicError::Resolution(ResolutionError::NoPlayableEntry(_)) => {
            "Couldn't find a playable video in the top results.".to_string()
        }
        MusicError::Resolution(ResolutionError::BackendFailure(e)) => format!("yt-dl error: {}", e),
        MusicError::Catalog(e) => format!("Spotify error: {}", e),
        MusicError::UserNotInVoiceChannel => "Join a voice channel first.".to_string(),
        other => other.to_string(),
    }
}

/// The text of a play reply.
pub fn describe_play_outcome(outcome: &PlayOutcome) -> String {
    match outcome {
        PlayOutcome::Single { track, enqueue } => match enqueue {
            EnqueueOutcome::Started { title, .. } => format!("**Now playing:** {}", title),
            EnqueueOutcome::Queued { position, .. } => {
                format!("Queued: **{}** (position #{})", track.title, position)
            }
            EnqueueOutcome::NothingPlayable => {
                format!("Failed to play audio for `{}`", track.title)
            }
        },
        PlayOutcome::Batch(BatchOutcome {
            total,
            dropped_first,
            enqueue,
        }) => {
            let queued = total - usize::from(dropped_first.is_some());
            let mut lines = vec![format!("Queued {} Spotify tracks.", queued)];
            if let Some(e) = dropped_first {
                lines.push(format!("First track left out: {}", e));
            }
            match enqueue {
                EnqueueOutcome::Started { title, .. } => {
                    lines.push(format!("**Now playing:** {}", title))
                }
                EnqueueOutcome::NothingPlayable => {
                    lines.push("None of the tracks could be played.".to_string())
                }
                EnqueueOutcome::Queued { .. } => {}
            }
            lines.join("\n")
        }
    }
}

/// The text of a message a session posts on its own.
pub fn describe_announcement(announcement: &Announcement) -> String {
    match announcement {
        Announcement::NowPlaying { title } => format!("**Now playing:** {}", title),
        Announcement::Unplayable { title } => format!("Failed to find audio for `{}`", title),
    }
}

/// The text of a queue reply.
pub fn describe_queue(status: &SessionStatus) -> String {
    if status.current.is_none() && status.queue.is_empty() {
        return "Nothing is playing or queued.".to_string();
    }

    let mut lines = Vec::new();
    if let Some(title) = &status.current {
        lines.push(format!("**Now Playing:** {}", title));
    }
    if !status.queue.is_empty() {
        lines.push("**Up Next:**".to_string());
        lines.extend(
            status
                .queue
                .iter()
                .enumerate()
                .map(|(i, title)| format!("{}. {}", i + 1, title)),
        );
    }
    lines.join("\n")
}

pub fn announcement(announcement: &Announcement) -> CreateEmbed {
    let (title, color) = match announcement {
        Announcement::NowPlaying { .. } => ("🎵 Now Playing", OK_COLOR),
        Announcement::Unplayable { .. } => ("❌ Skipped", ERROR_COLOR),
    };

    CreateEmbed::new()
        .title(title)
        .description(describe_announcement(announcement))
        .color(color)
}

pub fn music_error(err: &MusicError) -> CreateReply {
    error_reply(describe_error(err))
}

/// Create an embed for when a user is not connected to a voice channel
pub fn user_not_in_voice_channel() -> CreateReply {
    error_reply("Join a voice channel first.").ephemeral(true)
}

pub fn joined(channel_id: ChannelId) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🔊 Joined")
            .description(format!("Joined <#{}>", channel_id))
            .color(OK_COLOR),
    )
}

pub fn play_outcome(outcome: &PlayOutcome) -> CreateReply {
    let title = match outcome {
        PlayOutcome::Single {
            enqueue: EnqueueOutcome::NothingPlayable,
            ..
        } => return error_reply(describe_play_outcome(outcome)),
        PlayOutcome::Single {
            enqueue: EnqueueOutcome::Queued { .. },
            ..
        } => "🎵 Added to Queue",
        PlayOutcome::Single { .. } => "🎵 Now Playing",
        PlayOutcome::Batch(_) => "🎵 Playlist Queued",
    };

    CreateReply::default().embed(
        CreateEmbed::new()
            .title(title)
            .description(describe_play_outcome(outcome))
            .color(OK_COLOR),
    )
}

pub fn queue_status(status: &SessionStatus) -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("🎵 Music Queue")
            .description(describe_queue(status))
            .color(OK_COLOR),
    )
}

/// Create an embed for when a track is skipped
pub fn skipped() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏭️ Skipped")
            .description("Skipped.")
            .color(OK_COLOR),
    )
}

/// Create an embed for when there is no track to skip
pub fn nothing_playing() -> CreateReply {
    error_reply("Nothing is playing.")
}

/// Create an embed for when the bot stops playing music
pub fn stopped() -> CreateReply {
    CreateReply::default().embed(
        CreateEmbed::new()
            .title("⏹️ Stopped")
            .description("Stopped and left the voice channel.")
            .color(OK_COLOR),
    )
}
