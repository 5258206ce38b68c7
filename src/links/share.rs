use std::sync::Arc;

use super::{Aggregator, Catalog, GroupReport, Resolver, parse_all, route};
use crate::{
    config::Destinations,
    error::{Error, Result},
    info,
    management::Table,
    oauth::TokenRefresher,
    types::{LinkReference, TrackItem},
};

/// Result of processing one batch of shared links.
#[derive(Debug, Default)]
pub struct ShareReport {
    pub references: Vec<LinkReference>,
    /// Links that were not catalog links.
    pub ignored: usize,
    pub unresolved: Vec<(LinkReference, Error)>,
    pub groups: Vec<GroupReport>,
}

impl ShareReport {
    pub fn added(&self) -> impl Iterator<Item = &TrackItem> {
        self.groups.iter().flat_map(|g| g.added.iter())
    }

    pub fn added_count(&self) -> usize {
        self.groups.iter().map(|g| g.added.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.unresolved.is_empty() || self.groups.iter().any(|g| !g.is_success())
    }
}

/// Runs the whole link pipeline for one inbound share.
#[derive(Clone)]
pub struct Sharer {
    refresher: TokenRefresher,
    catalog: Arc<dyn Catalog>,
    table: Arc<dyn Table>,
    destinations: Destinations,
}

impl Sharer {
    pub fn new(
        refresher: TokenRefresher,
        catalog: Arc<dyn Catalog>,
        table: Arc<dyn Table>,
        destinations: Destinations,
    ) -> Self {
        Self {
            refresher,
            catalog,
            table,
            destinations,
        }
    }

    /// Parses `urls` shared by `user` in `space` and adds their tracks to the
    /// destination playlists.
    ///
    /// Only a missing authorization or a failing token refresh fails the whole
    /// batch; everything later degrades into the report.
    pub async fn share<S: AsRef<str>>(&self, space: &str, user: &str, urls: &[S]) -> Result<ShareReport> {
        let references = parse_all(space, user, urls);
        let mut report = ShareReport {
            ignored: urls.len() - references.len(),
            ..Default::default()
        };
        if references.is_empty() {
            return Ok(report);
        }

        let access = self.refresher.access(space).await?;
        let token = access.access();

        let resolution = Resolver::new(self.catalog.as_ref(), token)
            .resolve(&references)
            .await;
        let groups = route(resolution.tracks, &self.destinations);
        info!(
            "Adding {} track(s) from {} link(s) shared by {} in space {}",
            groups.iter().map(|g| g.tracks.len()).sum::<usize>(),
            references.len(),
            user,
            space
        );

        report.groups = Aggregator::new(self.catalog.as_ref(), self.table.as_ref(), token)
            .commit(space, groups)
            .await;
        report.unresolved = resolution.failed;
        report.references = references;
        Ok(report)
    }
}
