//! Token expiry evaluation.
//!
//! Pure functions over encoded JWT strings. Claims are read without
//! verifying the signature: that is the identity provider's job, the client
//! only needs to know when a token stops being worth presenting.
//!
//! Every check fails safe. A token that cannot be decoded, or that carries no
//! `exp` claim, is treated as already expired so callers refresh or log out
//! instead of presenting a dead credential.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde_json::Value;
use tracing::trace;

/// Claims read from a token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedClaims {
    /// Expiry, in seconds since the Unix epoch.
    pub exp: i64,
    /// Issued-at, in seconds since the Unix epoch.
    pub iat: Option<i64>,
    /// Subject, when the provider sets a string `sub`.
    pub sub: Option<String>,
}

/// Current time in seconds since the Unix epoch.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}

/// Decode the payload of a JWT.
///
/// Returns `None` for anything that isn't three dot-separated segments with a
/// base64url JSON object payload carrying a numeric `exp`. Never panics.
pub fn decode_claims(token: &str) -> Option<DecodedClaims> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        trace!("token is not a three-part JWT");
        return None;
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;

    let exp = numeric_claim(&claims, "exp")?;
    Some(DecodedClaims {
        exp,
        iat: numeric_claim(&claims, "iat"),
        sub: claims
            .get("sub")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn numeric_claim(claims: &Value, name: &str) -> Option<i64> {
    let value = claims.get(name)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs.floor() as i64))
}

/// True if the token is undecodable or its expiry is strictly before now.
pub fn is_expired(token: &str) -> bool {
    is_expired_at(token, now_unix())
}

/// [`is_expired`] against an explicit clock.
pub fn is_expired_at(token: &str, now: i64) -> bool {
    match decode_claims(token) {
        Some(claims) => claims.exp < now,
        None => true,
    }
}

/// True if the token is undecodable or expires before `now + minutes`.
pub fn will_expire_within(token: &str, minutes: u32) -> bool {
    will_expire_within_at(token, minutes, now_unix())
}

/// [`will_expire_within`] against an explicit clock.
pub fn will_expire_within_at(token: &str, minutes: u32, now: i64) -> bool {
    match decode_claims(token) {
        Some(claims) => claims.exp < now.saturating_add(i64::from(minutes) * 60),
        None => true,
    }
}

/// Seconds until the token expires, clamped at zero.
pub fn remaining_seconds(token: &str) -> u64 {
    remaining_seconds_at(token, now_unix())
}

/// [`remaining_seconds`] against an explicit clock.
pub fn remaining_seconds_at(token: &str, now: i64) -> u64 {
    decode_claims(token)
        .map(|claims| u64::try_from(claims.exp.saturating_sub(now)).unwrap_or(0))
        .unwrap_or(0)
}
