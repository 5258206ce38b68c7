use crate::{
    api::AppState,
    error,
    management::{Auth, Credential, Provider},
    success, warning,
};

/// Stores `refresh_token` as an already expired credential so the first use
/// refreshes it, then performs that refresh to check the token works.
pub async fn import(state: &AppState, space: &str, refresh_token: &str) {
    let credential = Credential::new(
        Auth::Spotify {
            access: String::new(),
            refresh: refresh_token.to_string(),
        },
        0,
    );

    if let Err(e) = state.store.save(space, Provider::Spotify, credential).await {
        error!("Failed to store credential. Err: {}", e);
    }

    match state.refresher.access(space).await {
        Ok(_) => success!("Imported Spotify credential for space {}", space),
        Err(e) => warning!(
            "Credential stored for space {} but refreshing it failed: {}",
            space,
            e
        ),
    }
}
