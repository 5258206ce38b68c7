use std::{collections::HashSet, sync::LazyLock};

use futures_util::future::join_all;
use regex::Regex;

use super::{Catalog, Page};
use crate::{
    error::{Error, Result},
    types::{LinkKind, LinkReference, TrackItem},
    warning,
};

static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://open\.spotify\.com/(?P<type>track|album|playlist)/(?P<id>[a-zA-Z0-9]+)")
        .unwrap()
});

/// Parses one shared URL. Anything that is not a catalog link yields `None`.
pub fn parse(space: &str, user: &str, url: &str) -> Option<LinkReference> {
    let captures = LINK_REGEX.captures(url)?;
    Some(LinkReference {
        kind: LinkKind::from_path(&captures["type"])?,
        id: captures["id"].to_string(),
        space: space.to_string(),
        user: user.to_string(),
    })
}

pub fn parse_all<S: AsRef<str>>(space: &str, user: &str, urls: &[S]) -> Vec<LinkReference> {
    urls.iter()
        .filter_map(|url| parse(space, user, url.as_ref()))
        .collect()
}

/// Keeps the first item of every track id.
pub fn dedup(mut items: Vec<TrackItem>) -> Vec<TrackItem> {
    let mut seen_ids = HashSet::new();
    items.retain(|item| seen_ids.insert(item.id.clone()));
    items
}

/// Expanded tracks of a batch plus the references that could not be expanded.
#[derive(Debug, Default)]
pub struct Resolution {
    pub tracks: Vec<TrackItem>,
    pub failed: Vec<(LinkReference, Error)>,
}

pub struct Resolver<'a> {
    catalog: &'a dyn Catalog,
    token: &'a str,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a dyn Catalog, token: &'a str) -> Self {
        Self { catalog, token }
    }

    /// All tracks behind `reference`, following every page of albums and
    /// playlists.
    pub async fn expand(&self, reference: &LinkReference) -> Result<Vec<TrackItem>> {
        let mut items = Vec::new();
        let mut offset = Some(0);

        while let Some(current) = offset {
            let page = self.fetch_page(reference, current).await?;
            // a page that does not move forward ends the walk
            offset = page.next_offset.filter(|next| *next > current);
            items.extend(page.tracks.into_iter().map(|t| t.into_item(reference)));
        }

        Ok(items)
    }

    /// Expands all references concurrently and merges duplicate tracks.
    pub async fn resolve(&self, references: &[LinkReference]) -> Resolution {
        let results = join_all(references.iter().map(|r| self.expand(r))).await;

        let mut resolution = Resolution::default();
        for (reference, result) in references.iter().zip(results) {
            match result {
                Ok(items) => resolution.tracks.extend(items),
                Err(e) => {
                    warning!(
                        "Failed to expand {} {} shared by {}: {}",
                        reference.kind,
                        reference.id,
                        reference.user,
                        e
                    );
                    resolution.failed.push((reference.clone(), e));
                }
            }
        }
        resolution.tracks = dedup(resolution.tracks);
        resolution
    }

    async fn fetch_page(&self, reference: &LinkReference, offset: u32) -> Result<Page> {
        match reference.kind {
            LinkKind::Track => {
                let track = self.catalog.track(self.token, &reference.id).await?;
                Ok(Page {
                    tracks: vec![track],
                    next_offset: None,
                })
            }
            LinkKind::Album => {
                self.catalog
                    .album_tracks(self.token, &reference.id, offset)
                    .await
            }
            LinkKind::Playlist => {
                self.catalog
                    .playlist_tracks(self.token, &reference.id, offset)
                    .await
            }
        }
    }
}
