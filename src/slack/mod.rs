//! # Slack Integration Module
//!
//! Everything the service needs from the chat side:
//!
//! - [`events`]: request signature verification for the events webhook.
//! - [`message`]: rendering a [`crate::links::ShareReport`] as a channel message.
//! - [`install`]: the app install flow, [`SlackClient`] as an
//!   [`crate::oauth::OAuthClient`] exchanging codes at `oauth.v2.access`.
//! - [`SlackClient`]: the Web API calls used, `team.info` to discover the
//!   space id and `chat.postMessage` to answer in the channel.
//!
//! The Web API reports most failures as `200 OK` with `"ok": false`; both
//! cases become [`Error::Upstream`].

pub mod events;
pub mod install;
pub mod message;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    config::SlackSettings,
    error::{Error, Result},
    types::{PostMessageResponse, SlackTeam, TeamInfoResponse},
};

#[derive(Clone)]
pub struct SlackClient {
    http: Client,
    settings: SlackSettings,
}

impl SlackClient {
    pub fn new(settings: SlackSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &SlackSettings {
        &self.settings
    }

    /// Same client authenticating with `token` instead of the configured one.
    pub fn with_token(&self, token: &str) -> Self {
        let mut settings = self.settings.clone();
        settings.access_token = token.to_string();
        Self {
            http: self.http.clone(),
            settings,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.settings.api_url.trim_end_matches('/'), method)
    }

    /// The workspace the bot token belongs to. Its id is the space of every
    /// stored record.
    pub async fn team_info(&self) -> Result<SlackTeam> {
        let response = self
            .http
            .get(self.method_url("team.info"))
            .bearer_auth(&self.settings.access_token)
            .send()
            .await?;
        let info: TeamInfoResponse = read_json(response).await?;

        match info {
            TeamInfoResponse {
                ok: true,
                team: Some(team),
                ..
            } => Ok(team),
            TeamInfoResponse { error, .. } => Err(api_error(error)),
        }
    }

    pub async fn post_message(&self, channel: &str, text: &str, blocks: Vec<Value>) -> Result<()> {
        let response = self
            .http
            .post(self.method_url("chat.postMessage"))
            .bearer_auth(&self.settings.access_token)
            .json(&json!({
                "channel": channel,
                "text": text,
                "blocks": blocks,
            }))
            .send()
            .await?;
        let posted: PostMessageResponse = read_json(response).await?;

        if posted.ok {
            Ok(())
        } else {
            Err(api_error(posted.error))
        }
    }
}

fn api_error(error: Option<String>) -> Error {
    Error::Upstream {
        service: "slack",
        status: 200,
        message: error.unwrap_or_else(|| "unknown error".to_string()),
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Upstream {
            service: "slack",
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json::<T>().await?)
}
