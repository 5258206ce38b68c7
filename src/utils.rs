use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};

/// Current time in epoch seconds.
pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Random single-use value correlating an authorization request with its callback.
pub fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Splits a scope list given as comma and/or whitespace separated values.
pub fn parse_scopes(scopes: &str) -> Vec<String> {
    scopes
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn format_timestamp(epoch: i64) -> String {
    DateTime::<Utc>::from_timestamp(epoch, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| epoch.to_string())
}

/// Expiry timestamp for a token valid for `expires_in` seconds from now.
pub fn expires_at(expires_in: u64) -> i64 {
    now().saturating_add(i64::try_from(expires_in).unwrap_or(i64::MAX))
}
