//! Observable session state.

use std::fmt;

use crate::profile::UserProfile;
use crate::tokens::AuthTokens;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Nothing has been read from storage yet.
    #[default]
    Uninitialized,
    /// Persisted credentials are being loaded.
    Restoring,
    /// No usable credentials.
    Unauthenticated,
    /// Credentials are held and believed valid.
    Authenticated,
    /// Authenticated, with a token refresh in flight.
    Refreshing,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Uninitialized => "uninitialized",
            SessionPhase::Restoring => "restoring",
            SessionPhase::Unauthenticated => "unauthenticated",
            SessionPhase::Authenticated => "authenticated",
            SessionPhase::Refreshing => "refreshing",
        };
        f.write_str(name)
    }
}

/// Snapshot of the session, as shown to consumers.
///
/// `is_authenticated` implies `tokens.is_some()`; the constructors below are
/// the only way the session machine builds authenticated snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub user: Option<UserProfile>,
    pub tokens: Option<AuthTokens>,
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub is_refreshing: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// The state at process start: unauthenticated and loading.
    pub fn initial() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            user: None,
            tokens: None,
            is_loading: true,
            is_authenticated: false,
            is_refreshing: false,
            error: None,
        }
    }

    pub fn authenticated(user: Option<UserProfile>, tokens: AuthTokens) -> Self {
        Self {
            phase: SessionPhase::Authenticated,
            user,
            tokens: Some(tokens),
            is_loading: false,
            is_authenticated: true,
            is_refreshing: false,
            error: None,
        }
    }

    pub fn unauthenticated(error: Option<String>) -> Self {
        Self {
            phase: SessionPhase::Unauthenticated,
            user: None,
            tokens: None,
            is_loading: false,
            is_authenticated: false,
            is_refreshing: false,
            error,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::initial()
    }
}
