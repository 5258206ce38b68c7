use std::sync::Arc;

use super::OAuthClient;
use crate::{
    error::{Error, Result},
    info,
    management::{Credential, CredentialStore, Provider},
};

/// How the access token handed out by [`TokenRefresher::access`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// The stored token had not expired yet.
    Current(Credential),
    /// This call refreshed the token and stored the result.
    Refreshed(Credential),
    /// Another invocation refreshed first; this is what it stored.
    LostRace(Credential),
}

impl Refresh {
    pub fn credential(&self) -> &Credential {
        match self {
            Refresh::Current(c) | Refresh::Refreshed(c) | Refresh::LostRace(c) => c,
        }
    }

    pub fn access(&self) -> &str {
        self.credential().auth.access()
    }
}

#[derive(Clone)]
pub struct TokenRefresher {
    store: CredentialStore,
    client: Arc<dyn OAuthClient>,
}

impl TokenRefresher {
    pub fn new(store: CredentialStore, client: Arc<dyn OAuthClient>) -> Self {
        Self { store, client }
    }

    /// Returns a credential whose access token is usable right now.
    ///
    /// Fails with `AuthenticationRequired` while no handshake was completed
    /// for `space`.
    pub async fn access(&self, space: &str) -> Result<Refresh> {
        let provider = self.client.provider();
        let current = self.stored(space, provider).await?;
        if !current.is_expired() {
            return Ok(Refresh::Current(current));
        }

        info!("Refreshing {} access token for space {}", provider, space);
        let refreshed = self.client.refresh(&current).await?;

        if self
            .store
            .refresh_update(space, provider, current.expires, refreshed.clone())
            .await?
        {
            return Ok(Refresh::Refreshed(refreshed));
        }

        // someone else won the update race, use what they stored
        info!("Lost {} refresh race for space {}, re-reading", provider, space);
        Ok(Refresh::LostRace(self.stored(space, provider).await?))
    }

    async fn stored(&self, space: &str, provider: Provider) -> Result<Credential> {
        let record = match self.store.get(space, provider).await {
            Ok(record) => record,
            Err(Error::NotFound { .. }) => return Err(auth_required(space, provider)),
            Err(e) => return Err(e),
        };
        record
            .credential()
            .ok_or_else(|| auth_required(space, provider))
    }
}

fn auth_required(space: &str, provider: Provider) -> Error {
    Error::AuthenticationRequired {
        space: space.to_string(),
        provider,
    }
}
