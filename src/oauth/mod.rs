//! # OAuth Module
//!
//! Delegated authorization lifecycle of one provider per space:
//!
//! ```text
//! UNSTARTED ──start──▶ PENDING(nonce) ──complete──▶ AUTHORIZED
//!     ▲                     │                           │
//!     └──────── start (overwrites prior state) ◀────────┘
//! ```
//!
//! - [`Handshake`] issues the authorization URL and commits exchanged tokens
//!   only while the nonce it issued is still pending.
//! - [`TokenRefresher`] hands out a usable access token, refreshing expired
//!   ones with optimistic concurrency: the loser of a refresh race re-reads
//!   the winner's token and never spends the refresh token a second time.
//!
//! All coordination between concurrent invocations goes through the
//! conditional writes of [`crate::management::CredentialStore`].

mod handshake;
mod refresher;

use async_trait::async_trait;

use crate::{
    error::Result,
    management::{Credential, Provider},
};

pub use handshake::Handshake;
pub use refresher::Refresh;
pub use refresher::TokenRefresher;

/// Token endpoint operations of an authorization provider.
#[async_trait]
pub trait OAuthClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Authorization URL carrying `state` as the opaque correlation value.
    fn authorize_url(&self, state: &str) -> Result<String>;

    /// Exchanges an authorization code for a complete credential.
    async fn exchange_code(&self, code: &str) -> Result<Credential>;

    /// Obtains a new access token for `current`.
    async fn refresh(&self, current: &Credential) -> Result<Credential>;
}
