//! Identity provider trait.

use async_trait::async_trait;

use crate::credentials::LoginCredentials;
use crate::profile::UserProfile;
use crate::tokens::{AccessToken, AuthTokens, RefreshToken};
use crate::Result;

/// Output of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutput {
    pub user: UserProfile,
    pub tokens: AuthTokens,
}

/// The remote service that issues and revokes tokens.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a token pair and profile.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutput>;

    /// Exchange a refresh token for a new token pair.
    async fn refresh(
        &self,
        refresh_token: &RefreshToken,
        expires_in_mins: u32,
    ) -> Result<AuthTokens>;

    /// Fetch the profile of the token holder.
    async fn fetch_profile(&self, access_token: &AccessToken) -> Result<UserProfile>;

    /// Tell the provider the session is over.
    async fn logout(&self, access_token: &AccessToken) -> Result<()>;
}
