use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use super::AppState;
use crate::{oauth::Handshake, success, warning};

type Params = Query<HashMap<String, String>>;

pub async fn spotify_login(State(state): State<AppState>) -> Response {
    login(&state, &state.handshake).await
}

pub async fn spotify_authorized(State(state): State<AppState>, Query(params): Params) -> Response {
    authorized(&state, &state.handshake, &params).await
}

pub async fn slack_login(State(state): State<AppState>) -> Response {
    login(&state, &state.slack_handshake).await
}

pub async fn slack_authorized(State(state): State<AppState>, Query(params): Params) -> Response {
    authorized(&state, &state.slack_handshake, &params).await
}

async fn login(state: &AppState, handshake: &Handshake) -> Response {
    let space = match state.space().await {
        Ok(space) => space,
        Err(e) => {
            warning!("Could not fetch slack team info: {}", e);
            return e.into_response();
        }
    };

    match handshake.start_authorization(&space).await {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            warning!(
                "Failed to start {} authorization for space {}: {}",
                handshake.provider(),
                space,
                e
            );
            e.into_response()
        }
    }
}

async fn authorized(
    state: &AppState,
    handshake: &Handshake,
    params: &HashMap<String, String>,
) -> Response {
    let provider = handshake.provider();
    if let Some(error) = params.get("error") {
        warning!("{} denied the authorization: {}", provider, error);
        return (
            StatusCode::UNAUTHORIZED,
            Html("<h4>Authorization was denied.</h4>"),
        )
            .into_response();
    }

    let (Some(code), Some(verify)) = (params.get("code"), params.get("state")) else {
        return (
            StatusCode::BAD_REQUEST,
            Html("<h4>Missing required callback parameters.</h4>"),
        )
            .into_response();
    };

    let space = match state.space().await {
        Ok(space) => space,
        Err(e) => {
            warning!("Could not fetch slack team info: {}", e);
            return e.into_response();
        }
    };

    match handshake.complete_authorization(&space, code, verify).await {
        Ok(()) => {
            success!("{} authorized for space {}", provider, space);
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>").into_response()
        }
        Err(e) => {
            warning!("{} authorization for space {} failed: {}", provider, space, e);
            e.into_response()
        }
    }
}
