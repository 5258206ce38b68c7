#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use sharelist::{
    config::Destinations,
    error::{Error, Result},
    links::{Catalog, CatalogTrack, Page},
    management::{Auth, Credential, Provider},
    oauth::OAuthClient,
};
use tokio::sync::{Barrier, Mutex};

pub const SPACE: &str = "T024BE7LD";
pub const USER: &str = "U2147483697";

pub fn credential(access: &str, expires: i64) -> Credential {
    Credential::new(
        Auth::Spotify {
            access: access.to_string(),
            refresh: format!("refresh-{access}"),
        },
        expires,
    )
}

pub fn destinations() -> Destinations {
    Destinations {
        track: "pl-tracks".to_string(),
        album: "pl-albums".to_string(),
        playlist: "pl-playlists".to_string(),
    }
}

pub fn catalog_track(id: &str) -> CatalogTrack {
    CatalogTrack {
        id: id.to_string(),
        name: format!("Song {id}"),
        artists: vec![format!("Artist {id}")],
    }
}

fn upstream(message: &str) -> Error {
    Error::Upstream {
        service: "spotify",
        status: 500,
        message: message.to_string(),
    }
}

/// OAuth client issuing numbered tokens. With a barrier set, every refresh
/// waits until all concurrent refreshes have started.
#[derive(Default)]
pub struct FakeOAuth {
    pub exchanges: AtomicUsize,
    pub refreshes: AtomicUsize,
    pub barrier: Option<Barrier>,
    pub fail_exchange: bool,
}

impl FakeOAuth {
    pub fn with_barrier(n: usize) -> Self {
        Self {
            barrier: Some(Barrier::new(n)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl OAuthClient for FakeOAuth {
    fn provider(&self) -> Provider {
        Provider::Spotify
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        Ok(format!("https://accounts.example/authorize?state={state}"))
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential> {
        if self.fail_exchange {
            return Err(upstream("invalid_grant"));
        }
        let n = self.exchanges.fetch_add(1, Ordering::SeqCst);
        Ok(credential(&format!("{code}-access-{n}"), sharelist::utils::now() + 3600))
    }

    async fn refresh(&self, _current: &Credential) -> Result<Credential> {
        let n = self.refreshes.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        Ok(credential(&format!("refreshed-{n}"), sharelist::utils::now() + 3600))
    }
}

/// Catalog backed by fixed track lists. Albums and playlists are served in
/// pages of `page_size`.
pub struct FakeCatalog {
    pub tracks: HashMap<String, CatalogTrack>,
    pub albums: HashMap<String, Vec<CatalogTrack>>,
    pub playlists: HashMap<String, Vec<CatalogTrack>>,
    pub page_size: usize,
    pub failing_playlists: Vec<String>,
    pub added: Mutex<Vec<(String, Vec<String>)>>,
    pub page_requests: AtomicUsize,
}

impl Default for FakeCatalog {
    fn default() -> Self {
        Self {
            tracks: HashMap::new(),
            albums: HashMap::new(),
            playlists: HashMap::new(),
            page_size: 2,
            failing_playlists: Vec::new(),
            added: Mutex::new(Vec::new()),
            page_requests: AtomicUsize::new(0),
        }
    }
}

impl FakeCatalog {
    pub fn with_track(mut self, id: &str) -> Self {
        self.tracks.insert(id.to_string(), catalog_track(id));
        self
    }

    pub fn with_album(mut self, id: &str, track_ids: &[&str]) -> Self {
        self.albums
            .insert(id.to_string(), track_ids.iter().map(|t| catalog_track(t)).collect());
        self
    }

    pub fn with_playlist(mut self, id: &str, track_ids: &[&str]) -> Self {
        self.playlists
            .insert(id.to_string(), track_ids.iter().map(|t| catalog_track(t)).collect());
        self
    }

    pub fn failing_on(mut self, playlist_id: &str) -> Self {
        self.failing_playlists.push(playlist_id.to_string());
        self
    }

    pub async fn added_to(&self, playlist_id: &str) -> Vec<String> {
        self.added
            .lock()
            .await
            .iter()
            .filter(|(id, _)| id == playlist_id)
            .flat_map(|(_, uris)| uris.clone())
            .collect()
    }

    fn page(&self, tracks: Option<&Vec<CatalogTrack>>, offset: u32) -> Result<Page> {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let tracks = tracks.ok_or_else(|| upstream("not found"))?;
        let start = offset as usize;
        let end = (start + self.page_size).min(tracks.len());
        Ok(Page {
            tracks: tracks.get(start..end).unwrap_or_default().to_vec(),
            next_offset: (end < tracks.len()).then_some(end as u32),
        })
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn track(&self, _token: &str, id: &str) -> Result<CatalogTrack> {
        self.tracks.get(id).cloned().ok_or_else(|| upstream("not found"))
    }

    async fn album_tracks(&self, _token: &str, id: &str, offset: u32) -> Result<Page> {
        self.page(self.albums.get(id), offset)
    }

    async fn playlist_tracks(&self, _token: &str, id: &str, offset: u32) -> Result<Page> {
        self.page(self.playlists.get(id), offset)
    }

    async fn add_tracks(&self, _token: &str, playlist_id: &str, uris: &[String]) -> Result<()> {
        if self.failing_playlists.iter().any(|p| p == playlist_id) {
            return Err(upstream("playlist mutation failed"));
        }
        self.added
            .lock()
            .await
            .push((playlist_id.to_string(), uris.to_vec()));
        Ok(())
    }
}
