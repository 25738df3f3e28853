//! Implements `CatalogExpander` for Spotify track, playlist and album links.
//! Handles authentication (client credentials flow), URL parsing, and
//! paginated API requests.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::Regex;
use reqwest::header;
use serde::Deserialize;
use serenity::async_trait;
use std::sync::LazyLock;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::SpotifyCredentials;

use super::{CatalogError, CatalogExpander};

const API_BASE: &str = "https://api.spotify.com/v1";
const ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Result type specific to Spotify API operations.
pub type SpotifyResult<T> = Result<T, CatalogError>;

/// Regex to match and capture Spotify links by kind and id.
static SPOTIFY_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:open\.spotify\.com|spotify)/(?:intl-[a-z]{2}/)?(track|playlist|album)/([a-zA-Z0-9]+)(?:\?.*)?$",
    )
    .unwrap()
});

/// Whether `reference` points at the Spotify web player, whatever its kind.
pub fn is_spotify_link(reference: &str) -> bool {
    reference.contains("open.spotify.com") || SpotifyLink::parse(reference).is_some()
}

/// The kinds of Spotify link this expander understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpotifyLink {
    Track(String),
    Playlist(String),
    Album(String),
}

impl SpotifyLink {
    pub fn parse(url: &str) -> Option<Self> {
        let captures = SPOTIFY_LINK_REGEX.captures(url.trim())?;
        let id = captures.get(2)?.as_str().to_string();

        match captures.get(1)?.as_str() {
            "track" => Some(Self::Track(id)),
            "playlist" => Some(Self::Playlist(id)),
            "album" => Some(Self::Album(id)),
            _ => None,
        }
    }
}

/// Represents basic track information retrieved from Spotify.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotifyTrack {
    pub name: String,
    pub artists: Vec<String>,
}

impl SpotifyTrack {
    /// Reads a track object; `None` for entries without a catalog id (local files).
    fn from_json(track: &serde_json::Value) -> Option<Self> {
        if track["id"].is_null() {
            return None;
        }

        let name = track["name"].as_str()?.to_string();
        let artists = track["artists"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|a| a["name"].as_str().map(|s| s.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Some(Self { name, artists })
    }

    /// The text searched for on the audio side, e.g. "Song - Artist1, Artist2".
    pub fn search_query(&self) -> String {
        if self.artists.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.artists.join(", "))
        }
    }
}

/// Represents the response from Spotify's token endpoint.
#[derive(Debug, Deserialize)]
struct SpotifyToken {
    access_token: String,
    expires_in: u64,
    /// The time when the token was created, used to check expiry.
    #[serde(skip, default = "Instant::now")]
    created_at: Instant,
}

impl SpotifyToken {
    /// Considers the token expired 30 seconds before its actual expiry time.
    fn is_expired(&self) -> bool {
        let expiry = Duration::from_secs(self.expires_in);
        self.created_at.elapsed() > expiry.saturating_sub(Duration::from_secs(30))
    }
}

/// Spotify Web API client expanding links into search queries.
pub struct SpotifyApi {
    http: reqwest::Client,
    credentials: SpotifyCredentials,
    api_base: String,
    accounts_base: String,
    token: Mutex<Option<SpotifyToken>>,
}

impl SpotifyApi {
    pub fn new(http: reqwest::Client, credentials: SpotifyCredentials) -> Self {
        Self::with_base_urls(http, credentials, API_BASE, ACCOUNTS_BASE)
    }

    /// Points the client at alternative API hosts.
    pub fn with_base_urls(
        http: reqwest::Client,
        credentials: SpotifyCredentials,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            credentials,
            api_base: api_base.into(),
            accounts_base: accounts_base.into(),
            token: Mutex::new(None),
        }
    }

    /// Returns the cached access token, requesting a new one when missing or expired.
    async fn get_access_token(&self) -> SpotifyResult<String> {
        let mut token_lock = self.token.lock().await;

        if let Some(token) = &*token_lock {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Requesting a new Spotify access token");
        let auth = BASE64_STANDARD.encode(format!(
            "{}:{}",
            self.credentials.client_id, self.credentials.client_secret
        ));

        let response = self
            .http
            .post(format!("{}/api/token", self.accounts_base))
            .header(header::AUTHORIZATION, format!("Basic {}", auth))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                CatalogError::BackendFailure(format!("Failed to request Spotify token: {}", e))
            })?;

        let response = Self::check_status(response).await?;
        let token = response.json::<SpotifyToken>().await.map_err(|e| {
            CatalogError::BackendFailure(format!("Failed to parse Spotify token: {}", e))
        })?;

        let access_token = token.access_token.clone();
        *token_lock = Some(token);

        Ok(access_token)
    }

    async fn check_status(response: reqwest::Response) -> SpotifyResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Cannot read response".to_string());
        Err(CatalogError::BackendFailure(format!(
            "Spotify API error: {} - {}",
            status, text
        )))
    }

    async fn get_json(&self, url: &str, token: &str) -> SpotifyResult<serde_json::Value> {
        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| CatalogError::BackendFailure(format!("Spotify request failed: {}", e)))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| {
                CatalogError::BackendFailure(format!("Failed to parse Spotify response: {}", e))
            })
    }

    /// Fetches a single track by id.
    pub async fn get_track(&self, track_id: &str) -> SpotifyResult<SpotifyTrack> {
        let token = self.get_access_token().await?;
        let data = self
            .get_json(&format!("{}/tracks/{}", self.api_base, track_id), &token)
            .await?;

        SpotifyTrack::from_json(&data)
            .ok_or_else(|| CatalogError::BackendFailure("Missing track name".to_string()))
    }

    /// Walks every page of a tracks listing. `unwrap_item` extracts the
    /// track object from an item (playlists wrap it, albums don't).
    async fn get_paged_tracks<F>(&self, first_page: String, unwrap_item: F) -> SpotifyResult<Vec<SpotifyTrack>>
    where
        F: Fn(&serde_json::Value) -> &serde_json::Value,
    {
        let token = self.get_access_token().await?;
        let mut tracks = Vec::new();
        let mut next_url = Some(first_page);

        while let Some(url) = next_url.take() {
            let page = self.get_json(&url, &token).await?;

            if let Some(items) = page["items"].as_array() {
                tracks.extend(items.iter().filter_map(|item| SpotifyTrack::from_json(unwrap_item(item))));
            }

            next_url = page["next"].as_str().map(|s| s.to_string());
        }

        Ok(tracks)
    }

    /// Fetches all tracks from a playlist, in playlist order.
    pub async fn get_playlist_tracks(&self, playlist_id: &str) -> SpotifyResult<Vec<SpotifyTrack>> {
        let url = format!("{}/playlists/{}/tracks?limit=50", self.api_base, playlist_id);
        self.get_paged_tracks(url, |item| &item["track"]).await
    }

    /// Fetches all tracks from an album, in album order.
    pub async fn get_album_tracks(&self, album_id: &str) -> SpotifyResult<Vec<SpotifyTrack>> {
        let url = format!("{}/albums/{}/tracks?limit=50", self.api_base, album_id);
        self.get_paged_tracks(url, |item| item).await
    }
}

#[async_trait]
impl CatalogExpander for SpotifyApi {
    fn handles(&self, reference: &str) -> bool {
        is_spotify_link(reference)
    }

    async fn expand(&self, reference: &str) -> Result<Vec<String>, CatalogError> {
        info!("Expanding Spotify link: {}", reference);

        let tracks = match SpotifyLink::parse(reference) {
            Some(SpotifyLink::Track(id)) => vec![self.get_track(&id).await?],
            Some(SpotifyLink::Playlist(id)) => self.get_playlist_tracks(&id).await?,
            Some(SpotifyLink::Album(id)) => self.get_album_tracks(&id).await?,
            None => return Err(CatalogError::InvalidReference(reference.to_string())),
        };

        if tracks.is_empty() {
            return Err(CatalogError::EmptyCollection);
        }

        Ok(tracks.iter().map(SpotifyTrack::search_query).collect())
    }
}
