//! warden - Authenticated session manager
//!
//! Keeps a user's access/refresh token pair alive: restores it from durable
//! storage, refreshes it before (and after) it expires, attaches it to
//! outbound requests, and tears everything down on logout or when the
//! session can no longer be renewed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use warden::{ApiRequest, ApiUrl, AuthInterceptor, LoginCredentials, MemoryCredentialStore, Session};
//! use warden_http::{HttpExecutor, HttpIdentityProvider};
//!
//! # async fn example() -> Result<(), warden::Error> {
//! let api = ApiUrl::new("https://dummyjson.com")?;
//! let provider = Arc::new(HttpIdentityProvider::new(api.clone())?);
//! let session = Session::new(provider, Arc::new(MemoryCredentialStore::new()));
//!
//! session.initialize().await;
//! session.login(LoginCredentials::new("emilys", "emilyspass")).await?;
//!
//! let api_client = AuthInterceptor::new(session.clone(), HttpExecutor::new(api)?);
//! let me: serde_json::Value = api_client.send_json(ApiRequest::get("/auth/me")).await?;
//! println!("{}", me["email"]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod interceptor;
pub mod refresh;
pub mod session;

pub use config::SessionConfig;
pub use interceptor::AuthInterceptor;
pub use refresh::RefreshOutcome;
pub use session::Session;

pub use warden_core::{
    AccessToken, ApiRequest, ApiResponse, ApiUrl, AuthTokens, CredentialStore, Error,
    IdentityProvider, LoginCredentials, LoginOutput, MemoryCredentialStore, Method, Outcome,
    RefreshToken, RequestExecutor, Result, SessionPhase, SessionState, UserProfile, clock,
    credentials, error,
};
