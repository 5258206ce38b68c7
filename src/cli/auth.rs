use std::time::{Duration, Instant};

use super::spinner;
use crate::{
    api::AppState,
    config::Settings,
    error,
    management::Provider,
    server::start_api_server,
    success, warning,
};

const MAX_WAIT: Duration = Duration::from_secs(120);

/// Authorizes `provider` for `space` (default: the bot's workspace) through a
/// local callback server.
pub async fn auth(settings: &Settings, state: AppState, provider: Provider, space: Option<String>) {
    let state = state.with_space(space);
    let space = match state.space().await {
        Ok(space) => space,
        Err(e) => error!("Could not determine the workspace. Err: {}", e),
    };

    let server_state = state.clone();
    let address = settings.server_address.clone();
    tokio::spawn(async move {
        if let Err(e) = start_api_server(&address, server_state).await {
            warning!("Callback server stopped. Err: {}", e);
        }
    });

    let handshake = match provider {
        Provider::Spotify => &state.handshake,
        Provider::Slack => &state.slack_handshake,
    };
    let auth_url = match handshake.start_authorization(&space).await {
        Ok(url) => url,
        Err(e) => error!("Cannot start authorization. Err: {}", e),
    };

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    if wait_for_credential(&state, provider, &space).await {
        success!("{} authorized for space {}!", provider, space);
    } else {
        error!("Authentication failed or timed out.");
    }
}

/// Polls the store until the pending handshake of `space` holds a credential.
async fn wait_for_credential(state: &AppState, provider: Provider, space: &str) -> bool {
    let pb = spinner("Waiting for the authorization callback...");
    let start = Instant::now();

    while start.elapsed() < MAX_WAIT {
        if let Ok(record) = state.store.get(space, provider).await {
            if record.credential().is_some() {
                pb.finish_and_clear();
                return true;
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    pb.finish_and_clear();
    false
}
