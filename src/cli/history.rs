use tabled::Table;

use crate::{
    api::AppState,
    error, success,
    types::{HistoryEntry, HistoryTableRow},
    utils,
};

pub async fn history(state: &AppState, space: &str) {
    let entries: Vec<HistoryEntry> = match state.table.history(space).await {
        Ok(entries) => entries,
        Err(e) => error!("Failed to load history. Err: {}", e),
    };

    if entries.is_empty() {
        success!("Nothing shared in space {} yet.", space);
        return;
    }

    let rows: Vec<HistoryTableRow> = entries
        .into_iter()
        .map(|e| HistoryTableRow {
            added: utils::format_timestamp(e.added),
            playlist: e.playlist,
            name: e.name,
            artists: e.artist,
            user: e.user,
        })
        .collect();

    println!("{}", Table::new(rows));
}
