use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Classification of a shared catalog link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Track,
    Album,
    Playlist,
}

impl LinkKind {
    pub const ALL: [LinkKind; 3] = [LinkKind::Track, LinkKind::Album, LinkKind::Playlist];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Track => "track",
            LinkKind::Album => "album",
            LinkKind::Playlist => "playlist",
        }
    }

    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "track" => Some(LinkKind::Track),
            "album" => Some(LinkKind::Album),
            "playlist" => Some(LinkKind::Playlist),
            _ => None,
        }
    }

    /// Name shown for the destination playlist of this kind.
    pub fn label(&self) -> &'static str {
        match self {
            LinkKind::Track => "Shared tracks",
            LinkKind::Album => "Shared albums",
            LinkKind::Playlist => "Shared playlists",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed share: what was linked, where and by whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub kind: LinkKind,
    pub id: String,
    pub space: String,
    pub user: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackItem {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    /// Kind of the reference this track was expanded from.
    pub kind: LinkKind,
    pub user: String,
}

impl TrackItem {
    pub fn uri(&self) -> String {
        format!("spotify:track:{}", self.id)
    }

    pub fn artist_names(&self) -> String {
        self.artists.join(", ")
    }
}

/// Tracks routed to one destination playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistGroup {
    pub playlist_id: String,
    pub display_name: String,
    pub tracks: Vec<TrackItem>,
}

/// Audit record written once per track added to a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub space: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LinkKind,
    pub playlist: String,
    pub track: String,
    pub name: String,
    pub artist: String,
    pub user: String,
    pub added: i64,
}

impl HistoryEntry {
    pub fn new(space: &str, playlist: &str, track: &TrackItem, added: i64) -> Self {
        Self {
            space: space.to_string(),
            id: format!("{}|{}", playlist, track.id),
            kind: track.kind,
            playlist: playlist.to_string(),
            track: track.id.clone(),
            name: track.name.clone(),
            artist: track.artist_names(),
            user: track.user.clone(),
            added,
        }
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub playlist: String,
    pub name: String,
    pub artists: String,
}

#[derive(Tabled)]
pub struct HistoryTableRow {
    pub added: String,
    pub playlist: String,
    pub name: String,
    pub artists: String,
    pub user: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyTrack {
    /// Missing for local files inside playlists.
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTrackItem {
    pub track: Option<SpotifyTrack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEnvelope {
    UrlVerification { challenge: String },
    EventCallback { team_id: String, event: SlackEvent },
    /// Envelopes the service does not act on, such as `app_rate_limited`.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEvent {
    LinkShared(LinkSharedEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkSharedEvent {
    pub channel: String,
    pub user: String,
    pub links: Vec<SharedLink>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SharedLink {
    pub url: String,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackTeam {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamInfoResponse {
    pub ok: bool,
    #[serde(default)]
    pub team: Option<SlackTeam>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Answer of `oauth.v2.access`.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthAccessResponse {
    pub ok: bool,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub team: Option<SlackTeam>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}
