//! Runtime configuration read from the environment (after `.env` is loaded).

use std::env;
use std::time::Duration;
use thiserror::Error;

/// Seconds an idle session waits before leaving the voice channel.
pub const DEFAULT_AUTO_DISCONNECT_SECS: u64 = 60;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set together")]
    PartialSpotifyCredentials,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    pub auto_disconnect: Duration,
    pub ytdlp_path: String,
    pub spotify: Option<SpotifyCredentials>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let discord_token = non_empty("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let auto_disconnect = match non_empty("AUTO_DISCONNECT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name: "AUTO_DISCONNECT_SECS",
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_AUTO_DISCONNECT_SECS),
        };

        let spotify = match (non_empty("SPOTIFY_CLIENT_ID"), non_empty("SPOTIFY_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyCredentials {
                client_id,
                client_secret,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialSpotifyCredentials),
        };

        Ok(Self {
            discord_token,
            command_prefix: non_empty("COMMAND_PREFIX").unwrap_or_else(|| "!".to_string()),
            auto_disconnect,
            ytdlp_path: non_empty("YTDLP_PATH").unwrap_or_else(|| "yt-dlp".to_string()),
            spotify,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_with_only_token() {
        let config = Config::from_lookup(lookup(&[("DISCORD_TOKEN", "abc")])).unwrap();

        assert_eq!(
            config,
            Config {
                discord_token: "abc".to_string(),
                command_prefix: "!".to_string(),
                auto_disconnect: Duration::from_secs(60),
                ytdlp_path: "yt-dlp".to_string(),
                spotify: None,
            }
        );
    }

    #[test]
    fn test_missing_token() {
        assert_eq!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("DISCORD_TOKEN"))
        );
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("AUTO_DISCONNECT_SECS", "15"),
            ("YTDLP_PATH", "/opt/yt-dlp"),
            ("COMMAND_PREFIX", "?"),
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.auto_disconnect, Duration::from_secs(15));
        assert_eq!(config.ytdlp_path, "/opt/yt-dlp");
        assert_eq!(config.command_prefix, "?");
        assert_eq!(
            config.spotify,
            Some(SpotifyCredentials {
                client_id: "id".to_string(),
                client_secret: "secret".to_string(),
            })
        );
    }

    #[test]
    fn test_invalid_disconnect_delay() {
        let result = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("AUTO_DISCONNECT_SECS", "soon"),
        ]));

        assert_eq!(
            result,
            Err(ConfigError::Invalid {
                name: "AUTO_DISCONNECT_SECS",
                value: "soon".to_string(),
            })
        );
    }

    #[test]
    fn test_half_spotify_credentials_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("SPOTIFY_CLIENT_ID", "id"),
        ]));

        assert_eq!(result, Err(ConfigError::PartialSpotifyCredentials));
    }
}
