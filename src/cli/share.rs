use tabled::Table;

use super::spinner;
use crate::{api::AppState, error, info, success, types::TrackTableRow, warning};

pub async fn share(state: &AppState, space: &str, user: &str, urls: &[String]) {
    let pb = spinner(&format!("Sharing {} link(s)...", urls.len()));
    let result = state.sharer.share(space, user, urls).await;
    pb.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(e) => error!("Cannot share links. Err: {}", e),
    };

    if report.ignored > 0 {
        info!("Ignored {} link(s) that are not Spotify links", report.ignored);
    }
    for (reference, e) in &report.unresolved {
        warning!("Could not expand {} {}: {}", reference.kind, reference.id, e);
    }

    let rows: Vec<TrackTableRow> = report
        .groups
        .iter()
        .flat_map(|group| {
            group.added.iter().map(|track| TrackTableRow {
                playlist: group.display_name.clone(),
                name: track.name.clone(),
                artists: track.artist_names(),
            })
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(rows));
    }

    for group in &report.groups {
        if let Some(e) = &group.error {
            warning!(
                "{} ({}): added {} track(s) before failing: {}",
                group.display_name,
                group.playlist_id,
                group.added.len(),
                e
            );
        }
    }

    if report.has_failures() {
        warning!("Added {} track(s) with failures", report.added_count());
    } else {
        success!("Added {} track(s)", report.added_count());
    }
}
