//! Signature check for requests sent to the events webhook.
//!
//! Slack signs `v0:<timestamp>:<raw body>` with HMAC-SHA256 under the app's
//! signing secret and sends `v0=<hex digest>` in `X-Slack-Signature`.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";
const VERSION: &str = "v0";

/// Oldest request timestamp accepted, in seconds from now.
pub const TOLERANCE_SECS: i64 = 60 * 5;

/// Hex signature Slack would send for `body` at `timestamp`.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> Result<String> {
    let mac = mac(secret, timestamp, body)?;
    Ok(format!(
        "{VERSION}={}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Checks `signature` against the request and rejects timestamps further
/// than [`TOLERANCE_SECS`] from `now`.
pub fn verify_signature(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now: i64,
) -> Result<()> {
    let sent_at: i64 = timestamp
        .parse()
        .map_err(|_| Error::InvalidSignature(format!("malformed timestamp {timestamp}")))?;
    if (now - sent_at).abs() > TOLERANCE_SECS {
        return Err(Error::InvalidSignature(format!(
            "timestamp {timestamp} outside of tolerance"
        )));
    }

    let digest = signature
        .strip_prefix("v0=")
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
        .ok_or_else(|| Error::InvalidSignature("malformed signature".to_string()))?;

    mac(secret, timestamp, body)?
        .verify_slice(&digest)
        .map_err(|_| Error::InvalidSignature("signature mismatch".to_string()))
}

fn mac(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| Error::Config("invalid slack signing secret".to_string()))?;
    mac.update(VERSION.as_bytes());
    mac.update(b":");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}
