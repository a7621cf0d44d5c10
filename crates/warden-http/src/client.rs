//! HTTP client implementation.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use warden_core::error::{Error, InvalidInputError, ProviderError, TransportError};
use warden_core::{ApiRequest, ApiResponse, ApiUrl, Method, Result};

use crate::endpoints::ErrorResponse;

/// Request timeout applied to every call.
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let err = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(err)
}

/// HTTP client bound to one API base URL.
///
/// Clone is cheap: `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    api: ApiUrl,
}

impl HttpClient {
    /// Create a new client for the given API.
    pub fn new(api: ApiUrl) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("warden/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(transport_error)?;

        Ok(Self { client, api })
    }

    /// Returns the API URL this client is configured for.
    pub fn api(&self) -> &ApiUrl {
        &self.api
    }

    /// Unauthenticated POST with a JSON body.
    #[instrument(skip(self, body), fields(api = %self.api))]
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.api.endpoint(path);
        debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    /// Authenticated GET.
    #[instrument(skip(self, token), fields(api = %self.api))]
    pub async fn get_authed<R>(&self, path: &str, token: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = self.api.endpoint(path);
        debug!(%url, "authenticated GET");

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    /// Authenticated POST with no body whose response body is ignored.
    #[instrument(skip(self, token), fields(api = %self.api))]
    pub async fn post_authed_no_response(&self, path: &str, token: &str) -> Result<()> {
        let url = self.api.endpoint(path);
        debug!(%url, "authenticated POST (no response)");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Error::Provider(self.parse_error_response(response).await))
        }
    }

    /// Send a pipeline request as-is and return the raw response.
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.api.endpoint(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &url)
            .headers(Self::header_map(request)?);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect::<BTreeMap<_, _>>();
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        trace!(status, bytes = body.len(), "raw response");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    fn header_map(request: &ApiRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &request.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| InvalidInputError::Header {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| InvalidInputError::Header {
                name: name.clone(),
                reason: e.to_string(),
            })?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    /// Handle a response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "response");

        if status.is_success() {
            response.json::<R>().await.map_err(transport_error)
        } else {
            Err(Error::Provider(self.parse_error_response(response).await))
        }
    }

    /// Parse a provider error body.
    async fn parse_error_response(&self, response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>().await {
            Ok(body) => ProviderError::new(status, body.message),
            Err(_) => ProviderError::new(status, None),
        }
    }
}
