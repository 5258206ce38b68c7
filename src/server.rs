use std::{net::SocketAddr, str::FromStr};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::{
    api::{self, AppState},
    error::{Error, Result},
    info,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/spotify/login", get(api::spotify_login))
        .route("/spotify/authorized", get(api::spotify_authorized))
        .route("/slack/login", get(api::slack_login))
        .route("/slack/authorized", get(api::slack_authorized))
        .route("/slack/events", post(api::slack_events))
        .with_state(state)
}

/// Serves the API on `address` until the process is stopped.
pub async fn start_api_server(address: &str, state: AppState) -> Result<()> {
    let addr = SocketAddr::from_str(address)
        .map_err(|e| Error::Config(format!("invalid server address {address}: {e}")))?;

    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
