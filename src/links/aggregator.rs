use futures_util::future::join_all;

use super::Catalog;
use crate::{
    config::Destinations,
    error::Error,
    management::Table,
    types::{HistoryEntry, LinkKind, PlaylistGroup, TrackItem},
    utils, warning,
};

/// Most URIs the provider accepts in one add-tracks request.
pub const ADD_TRACKS_LIMIT: usize = 100;

/// Groups tracks by the destination playlist of the kind they were shared as.
///
/// Groups come out in link kind order; kinds configured with the same
/// playlist share one group.
pub fn route(tracks: Vec<TrackItem>, destinations: &Destinations) -> Vec<PlaylistGroup> {
    let mut groups: Vec<PlaylistGroup> = Vec::new();

    for kind in LinkKind::ALL {
        let members: Vec<TrackItem> = tracks.iter().filter(|t| t.kind == kind).cloned().collect();
        if members.is_empty() {
            continue;
        }

        let playlist_id = destinations.playlist_for(kind);
        match groups.iter_mut().find(|g| g.playlist_id == playlist_id) {
            Some(group) => group.tracks.extend(members),
            None => groups.push(PlaylistGroup {
                playlist_id: playlist_id.to_string(),
                display_name: kind.label().to_string(),
                tracks: members,
            }),
        }
    }

    groups
}

/// Outcome of committing one playlist group.
#[derive(Debug)]
pub struct GroupReport {
    pub playlist_id: String,
    pub display_name: String,
    /// Tracks the provider accepted.
    pub added: Vec<TrackItem>,
    /// Set when a mutation failed; tracks after the failing request were not sent.
    pub error: Option<Error>,
}

impl GroupReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Aggregator<'a> {
    catalog: &'a dyn Catalog,
    table: &'a dyn Table,
    token: &'a str,
}

impl<'a> Aggregator<'a> {
    pub fn new(catalog: &'a dyn Catalog, table: &'a dyn Table, token: &'a str) -> Self {
        Self {
            catalog,
            table,
            token,
        }
    }

    /// Adds every non-empty group to its playlist and records one history
    /// entry per added track, written as a single batch.
    ///
    /// Groups are committed independently: a failing group is reported and the
    /// others still go through. Nothing is rolled back.
    pub async fn commit(&self, space: &str, groups: Vec<PlaylistGroup>) -> Vec<GroupReport> {
        let reports = join_all(
            groups
                .into_iter()
                .filter(|g| !g.tracks.is_empty())
                .map(|g| self.commit_group(g)),
        )
        .await;

        let added = utils::now();
        let entries: Vec<HistoryEntry> = reports
            .iter()
            .flat_map(|report| {
                report
                    .added
                    .iter()
                    .map(|track| HistoryEntry::new(space, &report.playlist_id, track, added))
            })
            .collect();

        if !entries.is_empty() {
            let count = entries.len();
            if let Err(e) = self.table.append_history(entries).await {
                warning!(
                    "Failed to record {} history entries for space {}: {}",
                    count,
                    space,
                    e
                );
            }
        }

        reports
    }

    async fn commit_group(&self, group: PlaylistGroup) -> GroupReport {
        let mut report = GroupReport {
            playlist_id: group.playlist_id,
            display_name: group.display_name,
            added: Vec::new(),
            error: None,
        };

        for chunk in group.tracks.chunks(ADD_TRACKS_LIMIT) {
            let uris: Vec<String> = chunk.iter().map(TrackItem::uri).collect();
            match self
                .catalog
                .add_tracks(self.token, &report.playlist_id, &uris)
                .await
            {
                Ok(()) => report.added.extend_from_slice(chunk),
                Err(e) => {
                    warning!(
                        "Error adding {} track(s) to playlist {}: {}",
                        uris.len(),
                        report.playlist_id,
                        e
                    );
                    report.error = Some(e);
                    break;
                }
            }
        }

        report
    }
}
