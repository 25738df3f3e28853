//! Voice-channel music bot: per-guild playback sessions fed by yt-dlp search
//! and Spotify catalog expansion, played back through songbird.

use std::sync::{Arc, LazyLock};

pub mod commands;
pub mod config;

use commands::music::audio_sources::{CatalogExpander, SourceResolver};
use commands::music::utils::session_store::SessionStore;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// Process-wide HTTP client shared by the catalog API and songbird inputs.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub sessions: SessionStore,
    pub resolver: Arc<dyn SourceResolver>,
    /// `None` when no catalog credentials were configured.
    pub catalog: Option<Arc<dyn CatalogExpander>>,
}
