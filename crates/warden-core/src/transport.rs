//! Request and response descriptors for the request pipeline.
//!
//! These are plain values: the pipeline rewrites headers and bumps the
//! `attempt` counter explicitly instead of stamping markers onto a shared
//! request object.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::{Error, InvalidInputError, ProviderError};

/// Header carrying the bearer credential.
pub const AUTHORIZATION: &str = "authorization";

/// HTTP method of an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(InvalidInputError::Other {
                message: format!("unsupported HTTP method '{}'", s),
            }
            .into()),
        }
    }
}

/// An outbound request, relative to the API base URL.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    /// Header names are stored lowercase.
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
    /// How many times this request has already been re-issued.
    pub attempt: u32,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
            attempt: 0,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Set (or replace) the bearer credential.
    pub fn set_bearer(&mut self, token: &str) {
        self.headers
            .insert(AUTHORIZATION.to_string(), format!("Bearer {}", token));
    }

    /// Returns true once the request has been re-issued.
    pub fn is_retry(&self) -> bool {
        self.attempt > 0
    }
}

// Header values may carry credentials; only names are shown.
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("has_body", &self.body.is_some())
            .field("attempt", &self.attempt)
            .finish()
    }
}

/// A response from the request executor.
///
/// Non-success statuses are ordinary responses; only transport failures are
/// reported as errors by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode a success body, or turn a failure status into a [`ProviderError`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_success() {
            return Err(self.to_provider_error().into());
        }
        serde_json::from_slice(&self.body).map_err(|e| {
            InvalidInputError::Other {
                message: format!("malformed response body: {}", e),
            }
            .into()
        })
    }

    /// Build a provider error from this response, reading `message` from a JSON body.
    pub fn to_provider_error(&self) -> ProviderError {
        let message = serde_json::from_slice::<serde_json::Value>(&self.body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
        ProviderError::new(self.status, message)
    }
}
