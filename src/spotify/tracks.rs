use async_trait::async_trait;

use super::SpotifyClient;
use crate::{
    error::{Error, Result},
    links::{Catalog, CatalogTrack, Page},
    types::{Paging, PlaylistTrackItem, SpotifyTrack},
};

pub const ALBUM_PAGE_LIMIT: u32 = 50;
pub const PLAYLIST_PAGE_LIMIT: u32 = 100;

/// Converts a catalog track, skipping local files and podcast episodes.
fn catalog_track(track: SpotifyTrack) -> Option<CatalogTrack> {
    if track.item_type.as_deref().is_some_and(|t| t != "track") {
        return None;
    }
    Some(CatalogTrack {
        id: track.id?,
        name: track.name,
        artists: track.artists.into_iter().map(|a| a.name).collect(),
    })
}

/// Offset of the page after the one starting at `offset` holding `count` items.
fn next_offset<T>(paging: &Paging<T>, offset: u32, count: usize) -> Option<u32> {
    paging
        .next
        .as_ref()
        .map(|_| offset.saturating_add(u32::try_from(count).unwrap_or(u32::MAX)))
}

impl SpotifyClient {
    pub async fn get_track(&self, token: &str, id: &str) -> Result<CatalogTrack> {
        let url = self.api_url(&format!("/tracks/{id}"));
        let track: SpotifyTrack = self.get_json(token, &url).await?;
        catalog_track(track).ok_or_else(|| Error::Upstream {
            service: "spotify",
            status: 200,
            message: format!("{id} is not a playable track"),
        })
    }

    pub async fn get_album_tracks(&self, token: &str, id: &str, offset: u32) -> Result<Page> {
        let url = self.api_url(&format!(
            "/albums/{id}/tracks?limit={ALBUM_PAGE_LIMIT}&offset={offset}"
        ));
        let paging: Paging<SpotifyTrack> = self.get_json(token, &url).await?;
        let next_offset = next_offset(&paging, offset, paging.items.len());

        Ok(Page {
            tracks: paging.items.into_iter().filter_map(catalog_track).collect(),
            next_offset,
        })
    }

    pub async fn get_playlist_tracks(&self, token: &str, id: &str, offset: u32) -> Result<Page> {
        let url = self.api_url(&format!(
            "/playlists/{id}/tracks?limit={PLAYLIST_PAGE_LIMIT}&offset={offset}"
        ));
        let paging: Paging<PlaylistTrackItem> = self.get_json(token, &url).await?;
        let next_offset = next_offset(&paging, offset, paging.items.len());

        Ok(Page {
            tracks: paging
                .items
                .into_iter()
                .filter_map(|item| item.track.and_then(catalog_track))
                .collect(),
            next_offset,
        })
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn track(&self, token: &str, id: &str) -> Result<CatalogTrack> {
        self.get_track(token, id).await
    }

    async fn album_tracks(&self, token: &str, id: &str, offset: u32) -> Result<Page> {
        self.get_album_tracks(token, id, offset).await
    }

    async fn playlist_tracks(&self, token: &str, id: &str, offset: u32) -> Result<Page> {
        self.get_playlist_tracks(token, id, offset).await
    }

    async fn add_tracks(&self, token: &str, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.add_tracks_to_playlist(token, playlist_id, uris)
            .await
            .map(|_| ())
    }
}
