//! # Spotify Integration Module
//!
//! Spotify Web API client used by the rest of the crate through two seams:
//!
//! - [`crate::oauth::OAuthClient`] ([`auth`]): authorization URL, code
//!   exchange and refresh against the accounts service. The client id and
//!   secret are sent as HTTP Basic credentials.
//! - [`crate::links::Catalog`] ([`tracks`], [`playlist`]): track lookups,
//!   paged album and playlist listings, and adding tracks to playlists.
//!
//! ## Retries
//!
//! Only catalog reads are retried: a `502 Bad Gateway` is retried after a
//! short pause and `429 Too Many Requests` honours `Retry-After` up to two
//! minutes, both for at most [`MAX_ATTEMPTS`] attempts. Token requests and
//! playlist mutations are sent exactly once because repeating them can spend a
//! code twice or add tracks twice.
//!
//! ## Endpoints
//!
//! - `POST /api/token` - code exchange and refresh
//! - `GET /tracks/{id}`
//! - `GET /albums/{id}/tracks` - paged, 50 per page
//! - `GET /playlists/{id}/tracks` - paged, 100 per page
//! - `POST /playlists/{id}/tracks`

pub mod auth;
pub mod playlist;
pub mod tracks;

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    config::SpotifySettings,
    error::{Error, Result},
    warning,
};

pub const MAX_ATTEMPTS: u32 = 3;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(1);
const MAX_RETRY_AFTER: u64 = 120;

#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    settings: SpotifySettings,
}

impl SpotifyClient {
    pub fn new(settings: SpotifySettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &SpotifySettings {
        &self.settings
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_url.trim_end_matches('/'), path)
    }

    /// GET with the read retry policy described in the module docs.
    async fn get_json<T: DeserializeOwned>(&self, token: &str, url: &str) -> Result<T> {
        let mut attempt = 1;
        loop {
            let response = self.http.get(url).bearer_auth(token).send().await?;
            let status = response.status();

            if attempt < MAX_ATTEMPTS {
                if status == StatusCode::BAD_GATEWAY {
                    sleep(BAD_GATEWAY_DELAY).await;
                    attempt += 1;
                    continue;
                }
                if status == StatusCode::TOO_MANY_REQUESTS {
                    let retry_after = retry_after(&response);
                    if retry_after <= MAX_RETRY_AFTER {
                        sleep(Duration::from_secs(retry_after)).await;
                        attempt += 1;
                        continue;
                    }
                    warning!(
                        "Retry after has reached an abnormal high of {} seconds, giving up on {}",
                        retry_after,
                        url
                    );
                }
            }

            return read_json(response).await;
        }
    }
}

fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0)
}

/// Decodes a successful response or turns the error body into `Error::Upstream`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Upstream {
            service: "spotify",
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json::<T>().await?)
}
