//! Shared fixtures for session tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;

use warden::clock::now_unix;
use warden::error::{ProviderError, StorageError, TransportError};
use warden::{
    AccessToken, ApiRequest, ApiResponse, AuthTokens, CredentialStore, Error, IdentityProvider,
    LoginCredentials, LoginOutput, MemoryCredentialStore, RefreshToken, RequestExecutor, Result,
    UserProfile,
};

pub const VALID_USERNAME: &str = "validuser";
pub const VALID_PASSWORD: &str = "secret12";

/// Build an unsigned JWT expiring `lifetime_secs` from now.
pub fn jwt(lifetime_secs: i64, label: &str) -> String {
    let now = now_unix();
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD
        .encode(json!({ "sub": label, "iat": now, "exp": now + lifetime_secs }).to_string());
    format!("{header}.{payload}.signature")
}

pub fn profile() -> UserProfile {
    UserProfile {
        id: 7,
        email: "valid@example.com".into(),
        name: "Valid User".into(),
        username: VALID_USERNAME.into(),
        first_name: "Valid".into(),
        last_name: "User".into(),
        image: None,
    }
}

/// An identity provider that counts calls and can be told to misbehave.
pub struct MockProvider {
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    /// Lifetime of access tokens issued by login.
    pub login_access_secs: i64,
    /// Lifetime of access tokens issued by refresh.
    pub refreshed_access_secs: i64,
    pub refresh_delay: Duration,
    pub reject_refresh: bool,
    pub logout_down: bool,
    pub profile_down: bool,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            login_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            login_access_secs: 1800,
            refreshed_access_secs: 300,
            refresh_delay: Duration::ZERO,
            reject_refresh: false,
            logout_down: false,
            profile_down: false,
        }
    }
}

impl MockProvider {
    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutput> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        if credentials.username() != VALID_USERNAME || credentials.password() != VALID_PASSWORD {
            return Err(ProviderError::new(400, Some("Invalid credentials".into())).into());
        }
        Ok(LoginOutput {
            user: profile(),
            tokens: AuthTokens::new(
                jwt(self.login_access_secs, "login-access"),
                jwt(3600, "login-refresh"),
            ),
        })
    }

    async fn refresh(
        &self,
        _refresh_token: &RefreshToken,
        _expires_in_mins: u32,
    ) -> Result<AuthTokens> {
        let n = self.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.refresh_delay.is_zero() {
            tokio::time::sleep(self.refresh_delay).await;
        }
        if self.reject_refresh {
            return Err(ProviderError::new(401, Some("Invalid refresh token".into())).into());
        }
        Ok(AuthTokens::new(
            jwt(self.refreshed_access_secs, &format!("access-{n}")),
            jwt(3600, &format!("refresh-{n}")),
        ))
    }

    async fn fetch_profile(&self, _access_token: &AccessToken) -> Result<UserProfile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        if self.profile_down {
            return Err(TransportError::Timeout.into());
        }
        let mut user = profile();
        user.image = Some("https://example.com/valid.png".into());
        Ok(user)
    }

    async fn logout(&self, _access_token: &AccessToken) -> Result<()> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if self.logout_down {
            return Err(TransportError::Connection {
                message: "connection refused".into(),
            }
            .into());
        }
        Ok(())
    }
}

/// A store whose every read fails.
pub struct UnreadableStore;

#[async_trait]
impl CredentialStore for UnreadableStore {
    async fn read_key(&self, key: &str) -> Result<Option<String>> {
        Err(Error::Storage(StorageError::Io {
            key: key.to_string(),
            message: "permission denied".into(),
        }))
    }

    async fn write_key(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    async fn remove_key(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// A store that keeps tokens but cannot cache the profile or remove keys.
#[derive(Default)]
pub struct StickyStore {
    pub inner: MemoryCredentialStore,
}

#[async_trait]
impl CredentialStore for StickyStore {
    async fn read_key(&self, key: &str) -> Result<Option<String>> {
        self.inner.read_key(key).await
    }

    async fn write_key(&self, key: &str, value: &str) -> Result<()> {
        if key == "auth_user" {
            return Err(Error::Storage(StorageError::Io {
                key: key.to_string(),
                message: "disk full".into(),
            }));
        }
        self.inner.write_key(key, value).await
    }

    async fn remove_key(&self, key: &str) -> Result<()> {
        Err(Error::Storage(StorageError::Io {
            key: key.to_string(),
            message: "read-only filesystem".into(),
        }))
    }
}

/// An executor standing in for a protected API.
///
/// Any bearer is accepted unless it was revoked or everything is being
/// rejected; a request without a bearer gets a 401.
#[derive(Default)]
pub struct GatedExecutor {
    revoked: Mutex<Vec<String>>,
    reject_all: AtomicBool,
    pub seen: Mutex<Vec<ApiRequest>>,
}

impl GatedExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn revoke(&self, token: &str) {
        self.revoked.lock().unwrap().push(format!("Bearer {token}"));
    }

    pub fn reject_all(&self) {
        self.reject_all.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn request(&self, index: usize) -> ApiRequest {
        self.seen.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl RequestExecutor for GatedExecutor {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.seen.lock().unwrap().push(request.clone());
        let accepted = match request.header("authorization") {
            Some(bearer) => {
                !self.reject_all.load(Ordering::SeqCst)
                    && !self.revoked.lock().unwrap().iter().any(|r| r == bearer)
            }
            None => false,
        };
        if accepted {
            Ok(ApiResponse::new(200, r#"{"ok":true}"#))
        } else {
            Ok(ApiResponse::new(401, r#"{"message":"Token Expired!"}"#))
        }
    }
}
