//! # API Module
//!
//! HTTP endpoints served by `sharelist serve`.
//!
//! ## Endpoints
//!
//! - `GET /health` ([`health`]): liveness and version.
//! - `GET /spotify/login` ([`spotify_login`]): looks up the Slack workspace,
//!   starts a handshake for it and redirects to the Spotify consent page.
//! - `GET /spotify/authorized` ([`spotify_authorized`]): the OAuth redirect
//!   target. Completes the handshake when `state` matches the pending nonce.
//! - `GET /slack/login`, `GET /slack/authorized` ([`slack_login`],
//!   [`slack_authorized`]): the same handshake for installing the Slack app.
//!   The installed bot token replaces the configured one for that space.
//! - `POST /slack/events` ([`slack_events`]): signed Slack event callbacks.
//!   Answers the `url_verification` challenge and runs the share pipeline for
//!   `link_shared` events.
//!
//! ## Status mapping
//!
//! | failure                                       | status |
//! |-----------------------------------------------|--------|
//! | missing callback parameters, malformed body   | 400    |
//! | bad signature, unknown/expired state, no auth | 401    |
//! | Spotify or Slack request failed               | 502    |
//! | storage or anything else                      | 500    |

mod health;
mod oauth;
mod slack;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::{
    config::Settings,
    error::{Error, Result},
    links::Sharer,
    management::{CredentialStore, FileTable, Provider, Table},
    oauth::{Handshake, TokenRefresher},
    slack::SlackClient,
    spotify::SpotifyClient,
};

pub use health::health;
pub use oauth::slack_authorized;
pub use oauth::slack_login;
pub use oauth::spotify_authorized;
pub use oauth::spotify_login;
pub use slack::slack_events;

/// Services shared by every request handler and CLI command.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<dyn Table>,
    pub store: CredentialStore,
    pub handshake: Handshake,
    pub slack_handshake: Handshake,
    pub refresher: TokenRefresher,
    pub sharer: Sharer,
    pub slack: SlackClient,
    /// Space used instead of asking Slack which workspace the bot is in.
    pub space: Option<String>,
}

impl AppState {
    /// Wires the services against the file table named in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let table: Arc<dyn Table> = Arc::new(FileTable::open(&settings.table));
        Self::with_table(settings, table)
    }

    pub fn with_table(settings: &Settings, table: Arc<dyn Table>) -> Self {
        let spotify = Arc::new(SpotifyClient::new(settings.spotify.clone()));
        let store = CredentialStore::new(Arc::clone(&table));
        let handshake = Handshake::new(store.clone(), spotify.clone());
        let refresher = TokenRefresher::new(store.clone(), spotify.clone());
        let slack = SlackClient::new(settings.slack.clone());
        let slack_handshake = Handshake::new(store.clone(), Arc::new(slack.clone()));
        let sharer = Sharer::new(
            refresher.clone(),
            spotify,
            Arc::clone(&table),
            settings.destinations.clone(),
        );

        Self {
            table,
            store,
            handshake,
            slack_handshake,
            refresher,
            sharer,
            slack,
            space: None,
        }
    }

    pub fn with_space(mut self, space: Option<String>) -> Self {
        self.space = space;
        self
    }

    /// Id of the Slack workspace the bot is installed in, unless overridden.
    pub async fn space(&self) -> Result<String> {
        if let Some(space) = &self.space {
            return Ok(space.clone());
        }
        Ok(self.slack.team_info().await?.id)
    }

    /// Slack client for `space`, using the bot token installed there if any.
    pub async fn slack_for(&self, space: &str) -> Result<SlackClient> {
        match self.store.get(space, Provider::Slack).await {
            Ok(record) => Ok(match record.credential() {
                Some(credential) => self.slack.with_token(credential.auth.access()),
                None => self.slack.clone(),
            }),
            Err(Error::NotFound { .. }) => Ok(self.slack.clone()),
            Err(e) => Err(e),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match status {
            StatusCode::UNAUTHORIZED => "<h4>Authorization failed.</h4>",
            StatusCode::BAD_GATEWAY => "<h4>Upstream service unavailable.</h4>",
            _ => "<h4>Internal error.</h4>",
        };
        (status, Html(format!("{message}<p>{self}</p>"))).into_response()
    }
}
