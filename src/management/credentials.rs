use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils;

/// `expires` value for credentials that never need a refresh.
pub const NEVER_EXPIRES: i64 = i64::MAX;

/// Integration a credential record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Spotify,
    Slack,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Spotify => "spotify",
            Provider::Slack => "slack",
        }
    }

    /// Logical id of this provider's credential record inside a space.
    pub fn record_id(&self) -> String {
        format!("auth|{}", self.as_str())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider specific secrets, one shape per provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum Auth {
    Spotify { access: String, refresh: String },
    /// Bot token from the Slack app install. Stored with [`NEVER_EXPIRES`].
    Slack { access: String },
}

impl Auth {
    pub fn provider(&self) -> Provider {
        match self {
            Auth::Spotify { .. } => Provider::Spotify,
            Auth::Slack { .. } => Provider::Slack,
        }
    }

    pub fn access(&self) -> &str {
        match self {
            Auth::Spotify { access, .. } | Auth::Slack { access } => access,
        }
    }

    pub fn refresh(&self) -> Option<&str> {
        match self {
            Auth::Spotify { refresh, .. } => Some(refresh),
            Auth::Slack { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub auth: Auth,
    /// Epoch seconds after which `auth` no longer grants access.
    pub expires: i64,
}

impl Credential {
    pub fn new(auth: Auth, expires: i64) -> Self {
        Self { auth, expires }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(utils::now())
    }
}

/// Stored authorization state of one provider in one space.
///
/// Holds only `verify` while a handshake is pending and `auth`/`expires`
/// once it completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub space: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
}

impl CredentialRecord {
    pub fn pending(space: &str, provider: Provider, verify: String) -> Self {
        Self {
            space: space.to_string(),
            id: provider.record_id(),
            verify: Some(verify),
            auth: None,
            expires: None,
        }
    }

    pub fn authorized(space: &str, credential: Credential) -> Self {
        Self {
            space: space.to_string(),
            id: credential.auth.provider().record_id(),
            verify: None,
            auth: Some(credential.auth),
            expires: Some(credential.expires),
        }
    }

    /// The usable credential, if the handshake was ever completed.
    pub fn credential(&self) -> Option<Credential> {
        match (&self.auth, self.expires) {
            (Some(auth), Some(expires)) => Some(Credential::new(auth.clone(), expires)),
            _ => None,
        }
    }
}
