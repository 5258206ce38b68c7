use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use super::AppState;
use crate::{
    error::Error,
    info,
    slack::{
        events::{SIGNATURE_HEADER, TIMESTAMP_HEADER, verify_signature},
        message::{render_not_authorized, render_summary},
    },
    types::{LinkSharedEvent, SlackEnvelope, SlackEvent},
    utils, warning,
};

const RETRY_HEADER: &str = "x-slack-retry-num";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub async fn slack_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (Some(timestamp), Some(signature)) = (
        header(&headers, TIMESTAMP_HEADER),
        header(&headers, SIGNATURE_HEADER),
    ) else {
        return Error::InvalidSignature("missing signature headers".to_string()).into_response();
    };

    if let Err(e) = verify_signature(
        &state.slack.settings().signing_secret,
        timestamp,
        &body,
        signature,
        utils::now(),
    ) {
        warning!("Rejected slack event: {}", e);
        return e.into_response();
    }

    let envelope: SlackEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match envelope {
        SlackEnvelope::UrlVerification { challenge } => {
            Json(json!({ "challenge": challenge })).into_response()
        }
        SlackEnvelope::EventCallback {
            team_id,
            event: SlackEvent::LinkShared(event),
        } => {
            // the first delivery already ran the pipeline; running it again adds duplicates
            if let Some(retry) = header(&headers, RETRY_HEADER) {
                info!("Ignoring slack retry {} for space {}", retry, team_id);
                return StatusCode::OK.into_response();
            }
            link_shared(&state, &team_id, event).await
        }
        SlackEnvelope::EventCallback { .. } | SlackEnvelope::Other => {
            StatusCode::OK.into_response()
        }
    }
}

async fn link_shared(state: &AppState, space: &str, event: LinkSharedEvent) -> Response {
    info!(
        "In channel {} user {} shared {} link(s)",
        event.channel,
        event.user,
        event.links.len()
    );
    let urls: Vec<&str> = event.links.iter().map(|l| l.url.as_str()).collect();

    let slack = match state.slack_for(space).await {
        Ok(slack) => slack,
        Err(e) => {
            warning!("Cannot read the slack install of space {}: {}", space, e);
            state.slack.clone()
        }
    };

    let (text, blocks) = match state.sharer.share(space, &event.user, urls.as_slice()).await {
        Ok(report) => match render_summary(&report) {
            Some(summary) => summary,
            None => return StatusCode::OK.into_response(),
        },
        Err(Error::AuthenticationRequired { provider, .. }) => {
            warning!("{} is not authorized for space {} yet", provider, space);
            render_not_authorized(provider)
        }
        Err(e) => {
            warning!("Cannot share links in space {}: {}", space, e);
            return e.into_response();
        }
    };

    // the share already happened, a failed notification does not fail the event
    if let Err(e) = slack.post_message(&event.channel, &text, blocks).await {
        warning!("Failed to post to channel {}: {}", event.channel, e);
    }

    StatusCode::OK.into_response()
}
