//! Credential store trait.
//!
//! Backends implement four raw primitives. The session-facing operations are
//! provided methods that apply one policy for every backend: token writes
//! fail loudly, reads degrade to "absent", and profile writes and cleanup are
//! best-effort.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::Result;
use crate::error::{Error, StorageError};
use crate::outcome::Outcome;
use crate::profile::UserProfile;
use crate::tokens::{AccessToken, AuthTokens, RefreshToken};

/// Key holding the access token.
pub const ACCESS_TOKEN_KEY: &str = "auth_access_token";

/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "auth_refresh_token";

/// Reserved for a stored expiry timestamp. Expiry is always derived from the
/// token's own claim; this key is only ever removed.
pub const TOKEN_EXPIRY_KEY: &str = "auth_token_expiry";

/// Key holding the JSON-serialized [`UserProfile`].
pub const USER_KEY: &str = "auth_user";

/// Every key owned by the session, in removal order.
pub const ALL_KEYS: [&str; 4] = [
    ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
    TOKEN_EXPIRY_KEY,
    USER_KEY,
];

/// Durable key-value persistence for session credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a single key.
    async fn read_key(&self, key: &str) -> Result<Option<String>>;

    /// Write a single key.
    async fn write_key(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a single key. Removing an absent key is not an error.
    async fn remove_key(&self, key: &str) -> Result<()>;

    /// Write both tokens. Backends that can make the pair atomic should
    /// override this.
    async fn write_tokens(&self, tokens: &AuthTokens) -> Result<()> {
        self.write_key(ACCESS_TOKEN_KEY, tokens.access_token.as_str())
            .await?;
        self.write_key(REFRESH_TOKEN_KEY, tokens.refresh_token.as_str())
            .await
    }

    /// Persist a token pair. Failure is returned to the caller.
    async fn save_tokens(&self, tokens: &AuthTokens) -> Result<()> {
        match self.write_tokens(tokens).await {
            Ok(()) => {
                debug!("Saved tokens");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to save tokens");
                Err(e)
            }
        }
    }

    /// Load the token pair, propagating read failures.
    ///
    /// Returns `None` when either half is missing.
    async fn try_get_tokens(&self) -> Result<Option<AuthTokens>> {
        let access = self.read_key(ACCESS_TOKEN_KEY).await?;
        let refresh = self.read_key(REFRESH_TOKEN_KEY).await?;

        match (access, refresh) {
            (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
                Ok(Some(AuthTokens {
                    access_token: AccessToken::new(access),
                    refresh_token: RefreshToken::new(refresh),
                }))
            }
            _ => Ok(None),
        }
    }

    /// Load the token pair; read failures are logged and read as absent.
    async fn get_tokens(&self) -> Option<AuthTokens> {
        self.try_get_tokens().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read tokens from storage");
            None
        })
    }

    /// Persist the profile cache. Failure is logged and reported as advisory.
    async fn save_user(&self, user: &UserProfile) -> Outcome<()> {
        let result = match serde_json::to_string(user) {
            Ok(json) => self.write_key(USER_KEY, &json).await,
            Err(e) => Err(Error::Storage(StorageError::Serialization {
                key: USER_KEY.to_string(),
                message: e.to_string(),
            })),
        };

        if let Err(ref e) = result {
            warn!(error = %e, "Failed to save user profile");
        }
        Outcome::absorb(result, ())
    }

    /// Load the profile cache, propagating read failures.
    ///
    /// A stored value that doesn't parse is treated as absent.
    async fn try_get_user(&self) -> Result<Option<UserProfile>> {
        let Some(json) = self.read_key(USER_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&json) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed cached profile");
                Ok(None)
            }
        }
    }

    /// Load the profile cache; read failures are logged and read as absent.
    async fn get_user(&self) -> Option<UserProfile> {
        self.try_get_user().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read user profile from storage");
            None
        })
    }

    /// Remove every session key.
    ///
    /// Each key is attempted even if an earlier removal failed; the first
    /// failure is reported as advisory.
    async fn clear_auth_storage(&self) -> Outcome<()> {
        let mut outcome = Outcome::Ok(());
        for key in ALL_KEYS {
            let removed = self.remove_key(key).await;
            if let Err(ref e) = removed {
                warn!(key, error = %e, "Failed to remove key from storage");
            }
            outcome = outcome.and(Outcome::absorb(removed, ()));
        }
        debug!(advisory = outcome.is_advisory(), "Cleared auth storage");
        outcome
    }
}
