//! Token types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A short-lived bearer credential authorizing API calls.
///
/// # Security
///
/// Never logged or displayed in Debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A longer-lived credential exchanged once for a new token pair.
///
/// # Security
///
/// Never logged or displayed in Debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// An access/refresh token pair.
///
/// The pair is always stored and loaded together; a store holding only one
/// half reports no tokens at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

impl AuthTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: AccessToken::new(access_token),
            refresh_token: RefreshToken::new(refresh_token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_hides_value_in_debug() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn token_pair_hides_both_values_in_debug() {
        let tokens = AuthTokens::new("access-value", "refresh-value");
        let debug = format!("{:?}", tokens);
        assert!(!debug.contains("access-value"));
        assert!(!debug.contains("refresh-value"));
    }

    #[test]
    fn token_pair_uses_camel_case_fields() {
        let tokens: AuthTokens =
            serde_json::from_str(r#"{"accessToken":"a","refreshToken":"r"}"#).unwrap();
        assert_eq!(tokens.access_token.as_str(), "a");
        assert_eq!(tokens.refresh_token.as_str(), "r");
    }
}
