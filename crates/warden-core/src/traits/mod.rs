//! Core traits for credential storage, the identity provider and transport.

mod executor;
mod provider;
mod store;

pub use executor::RequestExecutor;
pub use provider::{IdentityProvider, LoginOutput};
pub use store::{
    ACCESS_TOKEN_KEY, ALL_KEYS, CredentialStore, REFRESH_TOKEN_KEY, TOKEN_EXPIRY_KEY, USER_KEY,
};
