//! Implements `SourceResolver` on top of the `yt-dlp` command-line tool.

use serenity::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{AudioSource, ResolutionError, SourceResolver, TrackReference};

/// How many search hits are inspected when looking for a playable entry.
const SEARCH_DEPTH: usize = 2;

/// Audio-only formats, preferring m4a which songbird decodes via symphonia.
const AUDIO_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio/best";

/// Resolves queries by shelling out to `yt-dlp`.
pub struct YoutubeResolver {
    ytdlp_path: String,
}

impl Default for YoutubeResolver {
    fn default() -> Self {
        Self::new("yt-dlp")
    }
}

impl YoutubeResolver {
    pub fn new(ytdlp_path: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
        }
    }

    /// Direct links are passed through, anything else becomes a search.
    fn search_target(query: &str) -> String {
        if AudioSource::is_url(query) {
            query.to_string()
        } else {
            format!("ytsearch{}:{}", SEARCH_DEPTH, query)
        }
    }

    /// Parses `yt-dlp -j` output: one JSON object per line, in rank order.
    ///
    /// Lines that are not JSON are ignored. The entry's `url` is the direct
    /// media address for the selected format; it is null for placeholders.
    pub fn parse_search_output(stdout: &str) -> Vec<TrackReference> {
        stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<serde_json::Value>(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("Ignoring non-JSON yt-dlp line: {}", e);
                    None
                }
            })
            .map(|entry| TrackReference {
                title: entry["title"].as_str().unwrap_or("Unknown").to_string(),
                locator: entry["url"]
                    .as_str()
                    .filter(|u| !u.is_empty())
                    .map(|u| u.to_string()),
            })
            .collect()
    }
}

#[async_trait]
impl SourceResolver for YoutubeResolver {
    async fn search(&self, query: &str) -> Result<Vec<TrackReference>, ResolutionError> {
        info!("Searching yt-dlp for: {}", query);
        let target = Self::search_target(query);

        let output = Command::new(&self.ytdlp_path)
            .args(["-j", "--no-playlist", "-f", AUDIO_FORMAT, &target])
            .output()
            .await
            .map_err(|e| ResolutionError::BackendFailure(format!("Failed to run yt-dlp: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("yt-dlp exited with {} for `{}`", output.status, query);
            return Err(ResolutionError::BackendFailure(stderr.trim().to_string()));
        }

        let candidates = Self::parse_search_output(&stdout);
        debug!("yt-dlp returned {} candidates for `{}`", candidates.len(), query);
        Ok(candidates)
    }
}
