//! Slack app install through OAuth v2.
//!
//! The bot token returned by `oauth.v2.access` does not expire and comes
//! without a refresh token, so it is stored with [`NEVER_EXPIRES`].

use async_trait::async_trait;
use reqwest::Url;

use super::{SlackClient, api_error, read_json};
use crate::{
    config::SlackOAuthSettings,
    error::{Error, Result},
    management::{Auth, Credential, NEVER_EXPIRES, Provider},
    oauth::OAuthClient,
    types::OAuthAccessResponse,
};

impl SlackClient {
    fn oauth(&self) -> Result<&SlackOAuthSettings> {
        self.settings.oauth.as_ref().ok_or_else(|| {
            Error::Config("env vars SLACK_CLIENT_ID/SLACK_CLIENT_SECRET not defined".to_string())
        })
    }
}

#[async_trait]
impl OAuthClient for SlackClient {
    fn provider(&self) -> Provider {
        Provider::Slack
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        let oauth = self.oauth()?;
        let scope = oauth.scopes.join(",");
        let url = Url::parse_with_params(
            &oauth.auth_url,
            &[
                ("client_id", oauth.client_id.as_str()),
                ("scope", scope.as_str()),
                ("redirect_uri", oauth.redirect_uri.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid authorization url: {e}")))?;
        Ok(url.to_string())
    }

    /// Never retried, the code is single use.
    async fn exchange_code(&self, code: &str) -> Result<Credential> {
        let oauth = self.oauth()?;
        let response = self
            .http
            .post(self.method_url("oauth.v2.access"))
            .form(&[
                ("client_id", oauth.client_id.as_str()),
                ("client_secret", oauth.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", oauth.redirect_uri.as_str()),
            ])
            .send()
            .await?;
        let access: OAuthAccessResponse = read_json(response).await?;

        match access {
            OAuthAccessResponse {
                ok: true,
                access_token: Some(access),
                ..
            } => Ok(Credential::new(Auth::Slack { access }, NEVER_EXPIRES)),
            OAuthAccessResponse { error, .. } => Err(api_error(error)),
        }
    }

    async fn refresh(&self, _current: &Credential) -> Result<Credential> {
        Err(Error::Upstream {
            service: "slack",
            status: 400,
            message: "bot tokens cannot be refreshed, install the app again".to_string(),
        })
    }
}
