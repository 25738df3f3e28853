//! Playback machinery behind the music commands.

pub mod announcer;
pub mod disconnect_timer;
pub mod embedded_messages;
pub mod event_handlers;
pub mod music_manager;
pub mod playback_backend;
pub mod queue_manager;
pub mod session;
pub mod session_store;
