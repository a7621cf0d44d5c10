//! Login credentials type.

use std::fmt;

use serde::Serialize;

/// Token lifetime requested on login when the caller doesn't pick one.
pub const DEFAULT_LOGIN_EXPIRES_IN_MINS: u32 = 30;

/// Login credentials for the identity provider.
///
/// # Security
///
/// The password is never exposed in Debug output.
///
/// # Example
///
/// ```
/// use warden_core::LoginCredentials;
///
/// let creds = LoginCredentials::new("validuser", "secret12").expires_in_mins(3);
/// assert_eq!(creds.username(), "validuser");
/// assert_eq!(creds.requested_lifetime_mins(), 3);
/// ```
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCredentials {
    username: String,
    password: String,
    expires_in_mins: u32,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            expires_in_mins: DEFAULT_LOGIN_EXPIRES_IN_MINS,
        }
    }

    /// Request a specific access token lifetime.
    pub fn expires_in_mins(mut self, minutes: u32) -> Self {
        self.expires_in_mins = minutes;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// Use this only when constructing authentication requests.
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn requested_lifetime_mins(&self) -> u32 {
        self.expires_in_mins
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("expires_in_mins", &self.expires_in_mins)
            .finish()
    }
}
