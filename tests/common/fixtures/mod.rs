//! Sample data used across the integration tests.

use rusty_dj::commands::music::audio_sources::TrackReference;

pub const SAMPLE_GUILD_ID: u64 = 123456789;
pub const OTHER_GUILD_ID: u64 = 987654321;
pub const DISCONNECT_SECS: u64 = 60;
pub const VOICE_CHANNEL_ID: u64 = 1111;
pub const TEXT_CHANNEL_ID: u64 = 2222;

pub const SPOTIFY_PLAYLIST: &str = "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M";

pub fn track(title: &str, locator: &str) -> TrackReference {
    TrackReference::resolved(title, locator)
}

pub fn deferred(title: &str) -> TrackReference {
    TrackReference::deferred(title)
}

pub fn titles(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// `song 1` .. `song n`, as a catalog would return them.
pub fn catalog_queries(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("song {}", i)).collect()
}
