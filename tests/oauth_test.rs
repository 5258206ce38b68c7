mod common;

use std::sync::{Arc, atomic::Ordering};

use async_trait::async_trait;
use common::{FakeOAuth, SPACE, credential};
use futures_util::future::join_all;
use sharelist::{
    error::{Error, Result},
    management::{Auth, Credential, CredentialStore, MemoryTable, NEVER_EXPIRES, Provider},
    oauth::{Handshake, OAuthClient, Refresh, TokenRefresher},
    utils,
};

/// Slack install issuing a fixed bot token.
struct FakeSlackInstall;

#[async_trait]
impl OAuthClient for FakeSlackInstall {
    fn provider(&self) -> Provider {
        Provider::Slack
    }

    fn authorize_url(&self, state: &str) -> Result<String> {
        Ok(format!("https://slack.example/oauth/v2/authorize?state={state}"))
    }

    async fn exchange_code(&self, _code: &str) -> Result<Credential> {
        Ok(Credential::new(
            Auth::Slack {
                access: "xoxb-installed".to_string(),
            },
            NEVER_EXPIRES,
        ))
    }

    async fn refresh(&self, _current: &Credential) -> Result<Credential> {
        panic!("bot tokens are never refreshed")
    }
}

fn store() -> CredentialStore {
    CredentialStore::new(Arc::new(MemoryTable::new()))
}

fn state_of(url: &str) -> String {
    url.split("state=").nth(1).unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_handshake_round_trip() {
    let store = store();
    let handshake = Handshake::new(store.clone(), Arc::new(FakeOAuth::default()));

    let url = handshake.start_authorization(SPACE).await.unwrap();
    let verify = state_of(&url);
    assert_eq!(verify.len(), 32);

    handshake
        .complete_authorization(SPACE, "code", &verify)
        .await
        .unwrap();

    let record = store.get(SPACE, Provider::Spotify).await.unwrap();
    assert_eq!(record.verify, None);
    assert_eq!(record.credential().unwrap().auth.access(), "code-access-0");
}

#[tokio::test]
async fn test_handshake_rejects_unknown_state() {
    let store = store();
    let handshake = Handshake::new(store.clone(), Arc::new(FakeOAuth::default()));
    handshake.start_authorization(SPACE).await.unwrap();

    let result = handshake.complete_authorization(SPACE, "code", "stale").await;
    assert!(matches!(result, Err(Error::InvalidOrExpiredState(_))));

    let record = store.get(SPACE, Provider::Spotify).await.unwrap();
    assert!(record.credential().is_none());
    assert!(record.verify.is_some());
}

#[tokio::test]
async fn test_handshake_restart_invalidates_first_nonce() {
    let handshake = Handshake::new(store(), Arc::new(FakeOAuth::default()));

    let first = state_of(&handshake.start_authorization(SPACE).await.unwrap());
    let second = state_of(&handshake.start_authorization(SPACE).await.unwrap());
    assert_ne!(first, second);

    assert!(
        handshake
            .complete_authorization(SPACE, "code", &first)
            .await
            .is_err()
    );
    assert!(
        handshake
            .complete_authorization(SPACE, "code", &second)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_handshake_exchange_failure_keeps_pending() {
    let store = store();
    let client = FakeOAuth {
        fail_exchange: true,
        ..Default::default()
    };
    let handshake = Handshake::new(store.clone(), Arc::new(client));
    let verify = state_of(&handshake.start_authorization(SPACE).await.unwrap());

    let result = handshake.complete_authorization(SPACE, "code", &verify).await;
    assert!(matches!(result, Err(Error::Upstream { .. })));

    let record = store.get(SPACE, Provider::Spotify).await.unwrap();
    assert_eq!(record.verify.as_deref(), Some(verify.as_str()));
}

#[tokio::test]
async fn test_access_without_authorization() {
    let store = store();
    let refresher = TokenRefresher::new(store.clone(), Arc::new(FakeOAuth::default()));

    let result = refresher.access(SPACE).await;
    assert!(matches!(result, Err(Error::AuthenticationRequired { .. })));

    // a pending handshake is not an authorization either
    store.begin_handshake(SPACE, Provider::Spotify).await.unwrap();
    let result = refresher.access(SPACE).await;
    assert!(matches!(result, Err(Error::AuthenticationRequired { .. })));
}

#[tokio::test]
async fn test_access_uses_current_token() {
    let store = store();
    let client = Arc::new(FakeOAuth::default());
    let refresher = TokenRefresher::new(store.clone(), client.clone());
    store
        .save(SPACE, Provider::Spotify, credential("fresh", NEVER_EXPIRES))
        .await
        .unwrap();

    let access = refresher.access(SPACE).await.unwrap();
    assert!(matches!(access, Refresh::Current(_)));
    assert_eq!(access.access(), "fresh");
    assert_eq!(client.refreshes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_access_refreshes_expired_token() {
    let store = store();
    let refresher = TokenRefresher::new(store.clone(), Arc::new(FakeOAuth::default()));
    store
        .save(SPACE, Provider::Spotify, credential("stale", 0))
        .await
        .unwrap();

    let access = refresher.access(SPACE).await.unwrap();
    assert!(matches!(access, Refresh::Refreshed(_)));
    assert_eq!(access.access(), "refreshed-0");

    let record = store.get(SPACE, Provider::Spotify).await.unwrap();
    assert_eq!(record.credential().unwrap().auth.access(), "refreshed-0");
    assert!(record.expires.unwrap() > utils::now());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refresh_has_single_winner() {
    const CALLERS: usize = 5;

    let store = store();
    let client = Arc::new(FakeOAuth::with_barrier(CALLERS));
    let refresher = TokenRefresher::new(store.clone(), client.clone());
    store
        .save(SPACE, Provider::Spotify, credential("stale", 0))
        .await
        .unwrap();

    let handles = (0..CALLERS).map(|_| {
        let refresher = refresher.clone();
        tokio::spawn(async move { refresher.access(SPACE).await })
    });
    let results: Vec<Refresh> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    assert_eq!(client.refreshes.load(Ordering::SeqCst), CALLERS);

    let winners: Vec<&Refresh> = results
        .iter()
        .filter(|r| matches!(r, Refresh::Refreshed(_)))
        .collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Refresh::LostRace(_)))
            .count(),
        CALLERS - 1
    );

    // everybody ends up with the token the winner stored
    let stored = store.get(SPACE, Provider::Spotify).await.unwrap();
    let stored_access = stored.credential().unwrap().auth.access().to_string();
    assert_eq!(winners[0].access(), stored_access);
    assert!(results.iter().all(|r| r.access() == stored_access));
}

#[tokio::test]
async fn test_slack_and_spotify_handshakes_are_independent() {
    let store = store();
    let spotify = Handshake::new(store.clone(), Arc::new(FakeOAuth::default()));
    let slack = Handshake::new(store.clone(), Arc::new(FakeSlackInstall));

    let spotify_state = state_of(&spotify.start_authorization(SPACE).await.unwrap());
    let slack_state = state_of(&slack.start_authorization(SPACE).await.unwrap());

    // each nonce only completes its own provider
    assert!(matches!(
        slack.complete_authorization(SPACE, "code", &spotify_state).await,
        Err(Error::InvalidOrExpiredState(_))
    ));
    slack
        .complete_authorization(SPACE, "code", &slack_state)
        .await
        .unwrap();
    spotify
        .complete_authorization(SPACE, "code", &spotify_state)
        .await
        .unwrap();

    let slack_record = store.get(SPACE, Provider::Slack).await.unwrap();
    assert_eq!(slack_record.id, "auth|slack");
    assert_eq!(slack_record.expires, Some(NEVER_EXPIRES));
    let spotify_record = store.get(SPACE, Provider::Spotify).await.unwrap();
    assert_eq!(spotify_record.credential().unwrap().auth.access(), "code-access-0");

    let refresher = TokenRefresher::new(store.clone(), Arc::new(FakeSlackInstall));
    let access = refresher.access(SPACE).await.unwrap();
    assert!(matches!(access, Refresh::Current(_)));
    assert_eq!(access.access(), "xoxb-installed");
}
