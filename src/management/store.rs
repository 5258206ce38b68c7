use std::sync::Arc;

use super::{
    credentials::{Credential, CredentialRecord, Provider},
    table::{Condition, Table},
};
use crate::{
    error::{Error, Result},
    utils,
};

/// Authorization material of every provider and space, on top of a [`Table`].
///
/// No other component reads raw credential records.
#[derive(Clone)]
pub struct CredentialStore {
    table: Arc<dyn Table>,
}

impl CredentialStore {
    pub fn new(table: Arc<dyn Table>) -> Self {
        Self { table }
    }

    /// Starts a handshake: stores a fresh nonce as the only content of the
    /// record, replacing whatever was there before.
    pub async fn begin_handshake(&self, space: &str, provider: Provider) -> Result<String> {
        let verify = utils::generate_nonce();
        self.table
            .put(CredentialRecord::pending(space, provider, verify.clone()))
            .await?;
        Ok(verify)
    }

    /// Stores `credential` if `verify` is the nonce issued by the pending
    /// handshake. `Ok(false)` means the nonce is unknown, expired or already
    /// consumed.
    pub async fn complete_handshake(
        &self,
        space: &str,
        provider: Provider,
        verify: &str,
        credential: Credential,
    ) -> Result<bool> {
        Self::check_provider(provider, &credential)?;
        self.table
            .update(
                space,
                &provider.record_id(),
                Condition::VerifyIs(verify.to_string()),
                credential,
            )
            .await
    }

    pub async fn get(&self, space: &str, provider: Provider) -> Result<CredentialRecord> {
        self.table
            .get(space, &provider.record_id())
            .await?
            .ok_or_else(|| Error::NotFound {
                space: space.to_string(),
                provider,
            })
    }

    /// Replaces `auth`/`expires` unless the record moved on since it was read
    /// with `expected_expires`. `Ok(false)` signals that a concurrent writer won.
    pub async fn refresh_update(
        &self,
        space: &str,
        provider: Provider,
        expected_expires: i64,
        credential: Credential,
    ) -> Result<bool> {
        Self::check_provider(provider, &credential)?;
        self.table
            .update(
                space,
                &provider.record_id(),
                Condition::ExpiresIs(expected_expires),
                credential,
            )
            .await
    }

    /// Unconditional full overwrite with a complete credential.
    pub async fn save(&self, space: &str, provider: Provider, credential: Credential) -> Result<()> {
        Self::check_provider(provider, &credential)?;
        self.table
            .put(CredentialRecord::authorized(space, credential))
            .await
    }

    fn check_provider(expected: Provider, credential: &Credential) -> Result<()> {
        let found = credential.auth.provider();
        if found != expected {
            return Err(Error::ProviderMismatch { expected, found });
        }
        Ok(())
    }
}
