//! This module aggregates all the command modules for the bot.

/// Commands related to music playback: join, play, skip, stop, queue.
pub mod music;
