//! Request/response bodies for the provider's auth endpoints.

use serde::{Deserialize, Serialize};

use warden_core::{AuthTokens, UserProfile};

/// Request body for the refresh endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
    pub expires_in_mins: u32,
}

/// Response from the login endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    pub id: u64,
    pub email: String,
    #[serde(default)]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
}

impl LoginResponse {
    pub(crate) fn into_parts(self) -> (UserProfile, AuthTokens) {
        let user = UserProfile {
            id: self.id,
            email: self.email,
            name: String::new(),
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            image: self.image,
        }
        .with_derived_name();
        (user, AuthTokens::new(self.access_token, self.refresh_token))
    }
}

/// Error body returned by the provider.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: Option<String>,
}
