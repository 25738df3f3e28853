//! Common test utilities, fixtures, and mocks shared by the integration tests.
#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use rusty_dj::commands::music::utils::session::{SessionError, SessionHandle};
use serenity::model::id::GuildId;
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing::Level;

use mocks::{FakeBackend, FakeResolver, RecordingAnnouncer};

static INIT: Once = Once::new();

/// Initialize tracing for tests
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .init();
    });
}

/// Spawns a session for the sample guild using the default 60s disconnect delay.
pub fn spawn_session(backend: &Arc<FakeBackend>, resolver: &Arc<FakeResolver>) -> SessionHandle {
    spawn_announcing_session(backend, resolver, &Arc::new(RecordingAnnouncer::default()))
}

pub fn spawn_announcing_session(
    backend: &Arc<FakeBackend>,
    resolver: &Arc<FakeResolver>,
    announcer: &Arc<RecordingAnnouncer>,
) -> SessionHandle {
    init();
    SessionHandle::spawn(
        GuildId::new(fixtures::SAMPLE_GUILD_ID),
        backend.clone(),
        resolver.clone(),
        announcer.clone(),
        Duration::from_secs(fixtures::DISCONNECT_SECS),
    )
}

/// Skips whatever is playing right now, the way the `skip` command does.
pub async fn skip_current(session: &SessionHandle) -> Result<(), SessionError> {
    let now_playing = session
        .now_playing()
        .await?
        .ok_or(SessionError::NothingPlaying)?;
    session.skip(now_playing.token).await
}
