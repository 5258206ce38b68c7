use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Url, header::AUTHORIZATION};

use super::{SpotifyClient, read_json};
use crate::{
    error::{Error, Result},
    management::{Auth, Credential, Provider},
    oauth::OAuthClient,
    types::TokenResponse,
    utils,
};

impl SpotifyClient {
    fn basic_auth_header(&self) -> String {
        let credentials = format!(
            "{}:{}",
            self.settings.client_id, self.settings.client_secret
        );
        format!("Basic {}", STANDARD.encode(credentials))
    }

    /// Posts a grant to the token endpoint. Never retried.
    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(&self.settings.token_url)
            .header(AUTHORIZATION, self.basic_auth_header())
            .form(form)
            .send()
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl OAuthClient for SpotifyClient {
    fn provider(&self) -> Provider {
        Provider::Spotify
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        let scope = self.settings.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.settings.auth_url,
            &[
                ("client_id", self.settings.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid authorization url: {e}")))?;
        Ok(url.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<Credential> {
        let token = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
            ])
            .await?;

        let refresh = token.refresh_token.ok_or_else(|| Error::Upstream {
            service: "spotify",
            status: 200,
            message: "token response without refresh_token".to_string(),
        })?;

        Ok(Credential::new(
            Auth::Spotify {
                access: token.access_token,
                refresh,
            },
            utils::expires_at(token.expires_in),
        ))
    }

    async fn refresh(&self, current: &Credential) -> Result<Credential> {
        let Auth::Spotify { refresh, .. } = &current.auth else {
            return Err(Error::ProviderMismatch {
                expected: Provider::Spotify,
                found: current.auth.provider(),
            });
        };

        let token = self
            .token_request(&[("grant_type", "refresh_token"), ("refresh_token", refresh.as_str())])
            .await?;

        Ok(Credential::new(
            Auth::Spotify {
                access: token.access_token,
                // spotify only sometimes rotates the refresh token
                refresh: token.refresh_token.unwrap_or_else(|| refresh.clone()),
            },
            utils::expires_at(token.expires_in),
        ))
    }
}
