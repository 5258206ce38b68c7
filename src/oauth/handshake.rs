use std::sync::Arc;

use super::OAuthClient;
use crate::{
    error::{Error, Result},
    management::{CredentialStore, Provider},
};

/// Authorization-code handshake guarded by a single-use nonce.
#[derive(Clone)]
pub struct Handshake {
    store: CredentialStore,
    client: Arc<dyn OAuthClient>,
}

impl Handshake {
    pub fn new(store: CredentialStore, client: Arc<dyn OAuthClient>) -> Self {
        Self { store, client }
    }

    pub fn provider(&self) -> Provider {
        self.client.provider()
    }

    /// Puts `space` into the pending state and returns the URL the user has
    /// to visit to grant access.
    pub async fn start_authorization(&self, space: &str) -> Result<String> {
        let verify = self
            .store
            .begin_handshake(space, self.client.provider())
            .await?;
        self.client.authorize_url(&verify)
    }

    /// Exchanges `code` and stores the resulting credential if `verify` is
    /// the nonce of the pending handshake.
    ///
    /// The code is spent by the exchange, so an `InvalidOrExpiredState`
    /// failure must not be retried. Exchange errors are returned unchanged.
    pub async fn complete_authorization(&self, space: &str, code: &str, verify: &str) -> Result<()> {
        let provider = self.client.provider();
        let credential = self.client.exchange_code(code).await?;

        if !self
            .store
            .complete_handshake(space, provider, verify, credential)
            .await?
        {
            return Err(Error::InvalidOrExpiredState(verify.to_string()));
        }
        Ok(())
    }
}
