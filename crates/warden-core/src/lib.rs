//! warden-core - Core types, token clock and traits for the warden session manager.
//!
//! This crate holds everything the session machinery agrees on: the token and
//! profile data model, the error taxonomy, the pure expiry functions, and the
//! traits implemented by storage and network backends.

pub mod clock;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod memory;
pub mod outcome;
pub mod profile;
pub mod state;
pub mod tokens;
pub mod traits;
pub mod transport;
pub mod types;

pub use clock::DecodedClaims;
pub use credentials::LoginCredentials;
pub use error::Error;
pub use memory::MemoryCredentialStore;
pub use outcome::Outcome;
pub use profile::UserProfile;
pub use state::{SessionPhase, SessionState};
pub use tokens::{AccessToken, AuthTokens, RefreshToken};
pub use traits::{CredentialStore, IdentityProvider, LoginOutput, RequestExecutor};
pub use transport::{ApiRequest, ApiResponse, Method};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
