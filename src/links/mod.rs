//! # Links Module
//!
//! Turns raw shared URLs into playlist additions:
//!
//! ```text
//! URLs ─parse─▶ LinkReference ─expand (paged)─▶ TrackItem ─dedup─▶ route ─▶ commit
//!                                                                  │          │
//!                                                     one group per playlist  add tracks + history
//! ```
//!
//! Malformed links are dropped while parsing. A reference that cannot be
//! expanded, or a group whose mutation fails, only removes itself from the
//! result; the rest of the batch is still committed.

mod aggregator;
mod resolver;
mod share;

use async_trait::async_trait;

use crate::{
    error::Result,
    types::{LinkReference, TrackItem},
};

pub use aggregator::ADD_TRACKS_LIMIT;
pub use aggregator::Aggregator;
pub use aggregator::GroupReport;
pub use aggregator::route;
pub use resolver::Resolution;
pub use resolver::Resolver;
pub use resolver::dedup;
pub use resolver::parse;
pub use resolver::parse_all;
pub use share::ShareReport;
pub use share::Sharer;

/// A track as the catalog describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
}

impl CatalogTrack {
    pub fn into_item(self, reference: &LinkReference) -> TrackItem {
        TrackItem {
            id: self.id,
            name: self.name,
            artists: self.artists,
            kind: reference.kind,
            user: reference.user.clone(),
        }
    }
}

/// One page of a container's tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub tracks: Vec<CatalogTrack>,
    /// Offset of the following page, `None` on the last one.
    pub next_offset: Option<u32>,
}

/// Music catalog operations used by the pipeline.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn track(&self, token: &str, id: &str) -> Result<CatalogTrack>;

    async fn album_tracks(&self, token: &str, id: &str, offset: u32) -> Result<Page>;

    async fn playlist_tracks(&self, token: &str, id: &str, offset: u32) -> Result<Page>;

    /// Appends `uris` to a playlist. Callers keep each call within
    /// [`ADD_TRACKS_LIMIT`] URIs.
    async fn add_tracks(&self, token: &str, playlist_id: &str, uris: &[String]) -> Result<()>;
}
