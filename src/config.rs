//! Configuration management for sharelist.
//!
//! Settings come from environment variables. A `.env` file in the local data
//! directory is loaded first, so values can be kept there instead of the
//! process environment:
//! - Linux: `~/.local/share/sharelist/.env`
//! - macOS: `~/Library/Application Support/sharelist/.env`
//! - Windows: `%LOCALAPPDATA%/sharelist/.env`
//!
//! Variables already present in the environment take precedence over the file.

use std::{env, path::PathBuf};

use crate::{
    error::{Error, Result},
    types::LinkKind,
    utils,
};

const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
const DEFAULT_SLACK_AUTH_URL: &str = "https://slack.com/oauth/v2/authorize";
const DEFAULT_SLACK_REDIRECT_URI: &str = "http://127.0.0.1:3000/slack/authorized";
const DEFAULT_SLACK_SCOPE: &str = "links:read,links:write,chat:write,team:read";

/// Loads environment variables from `sharelist/.env` in the local data
/// directory. A missing file is not an error.
pub async fn load_env() -> Result<()> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sharelist/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// OAuth client registration and endpoints of the Spotify integration.
#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

/// Destination playlist per link kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    pub track: String,
    pub album: String,
    pub playlist: String,
}

impl Destinations {
    pub fn playlist_for(&self, kind: LinkKind) -> &str {
        match kind {
            LinkKind::Track => &self.track,
            LinkKind::Album => &self.album,
            LinkKind::Playlist => &self.playlist,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlackSettings {
    pub signing_secret: String,
    /// Bot token used in spaces without an installed token of their own.
    pub access_token: String,
    pub api_url: String,
    /// App registration for the install flow, present when
    /// `SLACK_CLIENT_ID` and `SLACK_CLIENT_SECRET` are both set.
    pub oauth: Option<SlackOAuthSettings>,
}

#[derive(Debug, Clone)]
pub struct SlackOAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
}

impl SlackOAuthSettings {
    fn from_env() -> Option<Self> {
        let (Ok(client_id), Ok(client_secret)) =
            (required("SLACK_CLIENT_ID"), required("SLACK_CLIENT_SECRET"))
        else {
            return None;
        };
        Some(Self {
            client_id,
            client_secret,
            redirect_uri: optional("SLACK_REDIRECT_URI", DEFAULT_SLACK_REDIRECT_URI),
            scopes: utils::parse_scopes(&optional("SLACK_AUTH_SCOPE", DEFAULT_SLACK_SCOPE)),
            auth_url: optional("SLACK_AUTH_URL", DEFAULT_SLACK_AUTH_URL),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_address: String,
    pub spotify: SpotifySettings,
    pub destinations: Destinations,
    pub slack: SlackSettings,
    /// Name of the storage table.
    pub table: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server_address: required("SERVER_ADDRESS")?,
            spotify: SpotifySettings {
                client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
                client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
                redirect_uri: required("SPOTIFY_API_REDIRECT_URI")?,
                scopes: utils::parse_scopes(&required("SPOTIFY_API_AUTH_SCOPE")?),
                auth_url: optional("SPOTIFY_API_AUTH_URL", DEFAULT_SPOTIFY_AUTH_URL),
                token_url: optional("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL),
                api_url: optional("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL),
            },
            destinations: Destinations {
                track: required("SPOTIFY_TRACK_PLAYLIST_ID")?,
                album: required("SPOTIFY_ALBUM_PLAYLIST_ID")?,
                playlist: required("SPOTIFY_PLAYLIST_PLAYLIST_ID")?,
            },
            slack: SlackSettings {
                signing_secret: required("SLACK_SIGNING_SECRET")?,
                access_token: required("SLACK_ACCESS_TOKEN")?,
                api_url: optional("SLACK_API_URL", DEFAULT_SLACK_API_URL),
                oauth: SlackOAuthSettings::from_env(),
            },
            table: required("DB_TABLE_NAME")?,
        })
    }
}

/// Value of `name`; unset and empty are both treated as missing.
fn required(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!("env var {name} not defined/empty"))),
    }
}

fn optional(name: &str, default: &str) -> String {
    required(name).unwrap_or_else(|_| default.to_string())
}
