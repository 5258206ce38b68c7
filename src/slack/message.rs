use serde_json::{Value, json};

use crate::{links::ShareReport, management::Provider};

/// Fallback text and section blocks announcing what a share added.
///
/// One `• name - artists` line per added track. Returns `None` when nothing
/// was added.
pub fn render_summary(report: &ShareReport) -> Option<(String, Vec<Value>)> {
    let count = report.added_count();
    if count == 0 {
        return None;
    }

    let lines: Vec<String> = report
        .added()
        .map(|track| format!("• {} - {}", track.name, track.artist_names()))
        .collect();

    let blocks = vec![json!({
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": lines.join("\n"),
        }
    })];

    Some((format!("added {count} track(s)"), blocks))
}

/// Notice for a share that found no usable `provider` credential in the space.
pub fn render_not_authorized(provider: Provider) -> (String, Vec<Value>) {
    let text = format!("{provider} is not authorized for this workspace yet, nothing was added");
    let blocks = vec![json!({
        "type": "section",
        "text": {
            "type": "mrkdwn",
            "text": format!(":warning: {text}"),
        }
    })];
    (text, blocks)
}
