//! HTTP-backed identity provider.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use warden_core::endpoints::{LOGIN_PATH, LOGOUT_PATH, PROFILE_PATH, REFRESH_PATH};
use warden_core::{
    AccessToken, ApiUrl, AuthTokens, IdentityProvider, LoginCredentials, LoginOutput,
    RefreshToken, Result, UserProfile,
};

use crate::client::HttpClient;
use crate::endpoints::{LoginResponse, RefreshRequest};

/// An [`IdentityProvider`] speaking JSON over HTTP.
///
/// # Example
///
/// ```no_run
/// use warden_core::{ApiUrl, IdentityProvider, LoginCredentials};
/// use warden_http::HttpIdentityProvider;
///
/// # async fn example() -> Result<(), warden_core::Error> {
/// let provider = HttpIdentityProvider::new(ApiUrl::new("https://dummyjson.com")?)?;
/// let output = provider.login(&LoginCredentials::new("emilys", "emilyspass")).await?;
/// println!("Logged in as {}", output.user.name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: HttpClient,
}

impl HttpIdentityProvider {
    pub fn new(api: ApiUrl) -> Result<Self> {
        Ok(Self::from_client(HttpClient::new(api)?))
    }

    /// Share an existing client (and its connection pool).
    pub fn from_client(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutput> {
        info!("Logging in");

        let response: LoginResponse = self.client.post_json(LOGIN_PATH, credentials).await?;
        let (user, tokens) = response.into_parts();

        debug!(user_id = user.id, "Login accepted");
        Ok(LoginOutput { user, tokens })
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh(
        &self,
        refresh_token: &RefreshToken,
        expires_in_mins: u32,
    ) -> Result<AuthTokens> {
        debug!("Requesting token refresh");

        let request = RefreshRequest {
            refresh_token: refresh_token.as_str(),
            expires_in_mins,
        };
        self.client.post_json(REFRESH_PATH, &request).await
    }

    #[instrument(skip_all)]
    async fn fetch_profile(&self, access_token: &AccessToken) -> Result<UserProfile> {
        let profile: UserProfile = self
            .client
            .get_authed(PROFILE_PATH, access_token.as_str())
            .await?;
        Ok(profile.with_derived_name())
    }

    #[instrument(skip_all)]
    async fn logout(&self, access_token: &AccessToken) -> Result<()> {
        self.client
            .post_authed_no_response(LOGOUT_PATH, access_token.as_str())
            .await
    }
}
