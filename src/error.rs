//! Error types shared by the library.
//!
//! Storage conflicts are deliberately absent: conditional writes report a lost
//! compare-and-swap as `Ok(false)` and the caller decides what that means.

use axum::http::StatusCode;
use thiserror::Error;

use crate::management::Provider;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no {provider} record stored for space {space}")]
    NotFound { space: String, provider: Provider },

    #[error("{provider} is not authorized for space {space} yet")]
    AuthenticationRequired { space: String, provider: Provider },

    #[error("unknown/expired authorization state {0}")]
    InvalidOrExpiredState(String),

    #[error("{found} credential cannot be stored as {expected}")]
    ProviderMismatch { expected: Provider, found: Provider },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} responded with {status}: {message}")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("storage failure: {0}")]
    Storage(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid request signature: {0}")]
    InvalidSignature(String),
}

impl Error {
    /// HTTP status an API handler answers with when this error reaches it.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidOrExpiredState(_)
            | Error::AuthenticationRequired { .. }
            | Error::NotFound { .. }
            | Error::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            Error::Http(_) | Error::Upstream { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
