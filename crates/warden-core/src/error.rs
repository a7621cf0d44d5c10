//! Error types for warden.
//!
//! A single [`Error`] type with explicit variants for transport, identity
//! provider, storage, session and input validation failures.

use std::fmt;
use thiserror::Error;

/// Message shown when a fresh login fails without a provider-supplied reason.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Message shown when the refresh token can no longer mint new tokens.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please login again";

/// Message shown when persisted credentials cannot be read at startup.
pub const RESTORE_FAILED_MESSAGE: &str = "Failed to restore authentication state";

/// The unified error type for warden operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The identity provider answered with a non-success status.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Reading or writing the credential store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Session lifecycle errors (no session, expired session).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns a message suitable for showing to an end user.
    ///
    /// Provider errors carry the provider's own message when it sent one;
    /// everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Provider(ProviderError {
                message: Some(message),
                ..
            }) if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Returns true if this error is an HTTP 401 from the provider.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Provider(err) if err.is_unauthorized())
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-success response from the identity provider.
#[derive(Debug)]
pub struct ProviderError {
    /// HTTP status code.
    pub status: u16,
    /// Human-readable message from the provider body, if any.
    pub message: Option<String>,
}

impl ProviderError {
    /// Create a new provider error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Check if the provider rejected the credentials presented.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProviderError {}

/// Credential store errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing medium failed to read or write a key.
    #[error("I/O error on '{key}': {message}")]
    Io { key: String, message: String },

    /// A stored value could not be encoded or decoded.
    #[error("malformed value for '{key}': {message}")]
    Serialization { key: String, message: String },

    /// The store lock could not be acquired.
    #[error("lock failed: {message}")]
    Lock { message: String },
}

/// Session lifecycle errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No credentials are available.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The refresh token is missing, expired or was rejected.
    #[error("session expired")]
    SessionExpired,

    /// The session changed (logout, expiry) while the operation was in flight.
    #[error("session changed while the operation was in flight")]
    Superseded,
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A header name or value is not valid HTTP.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
