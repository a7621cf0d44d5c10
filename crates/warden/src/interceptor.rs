//! Request pipeline that attaches credentials and recovers from 401s.

use std::time::Instant;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use warden_core::{ApiRequest, ApiResponse, RequestExecutor, Result};

use crate::refresh::RefreshOutcome;
use crate::session::Session;

/// Wraps a [`RequestExecutor`] with the session's credentials.
///
/// Outbound, every request not on the no-auth allowlist gets the stored
/// access token as a bearer credential. Inbound, a 401 triggers one shared
/// refresh and a single retry with the new token. A request that has
/// already been retried is never retried again, and when the refresh fails
/// the original 401 is returned to the caller.
#[derive(Debug, Clone)]
pub struct AuthInterceptor<E> {
    session: Session,
    executor: E,
}

impl<E: RequestExecutor> AuthInterceptor<E> {
    pub fn new(session: Session, executor: E) -> Self {
        Self { session, executor }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Send a request through the pipeline.
    ///
    /// Non-success statuses are returned as responses; only transport
    /// failures are errors.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        let authenticated = self.session.config().requires_auth(&request.path);
        if authenticated {
            if let Some(tokens) = self.session.store().get_tokens().await {
                request.set_bearer(tokens.access_token.as_str());
            }
        }

        let response = self.exchange(&request).await?;
        if !response.is_unauthorized() || !authenticated || request.is_retry() {
            return Ok(response);
        }

        match self.session.refresh().await {
            RefreshOutcome::Refreshed(tokens) => {
                info!(path = %request.path, "Retrying request with refreshed token");
                request.attempt += 1;
                request.set_bearer(tokens.access_token.as_str());
                self.exchange(&request).await
            }
            outcome => {
                debug!(?outcome, path = %request.path, "Refresh failed, returning 401");
                Ok(response)
            }
        }
    }

    /// Send a request and decode a success body as JSON.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.send(request).await?.json()
    }

    async fn exchange(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let started = Instant::now();
        let result = self.executor.execute(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => debug!(
                method = %request.method,
                path = %request.path,
                status = response.status,
                attempt = request.attempt,
                elapsed_ms,
                "exchange"
            ),
            Err(e) => debug!(
                method = %request.method,
                path = %request.path,
                attempt = request.attempt,
                elapsed_ms,
                error = %e,
                "exchange failed"
            ),
        }
        result
    }
}
