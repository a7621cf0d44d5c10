//! HTTP-backed request executor.

use async_trait::async_trait;

use warden_core::{ApiRequest, ApiResponse, ApiUrl, RequestExecutor, Result};

use crate::client::HttpClient;

/// A [`RequestExecutor`] that sends requests with reqwest.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: HttpClient,
}

impl HttpExecutor {
    pub fn new(api: ApiUrl) -> Result<Self> {
        Ok(Self::from_client(HttpClient::new(api)?))
    }

    pub fn from_client(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.client.send(request).await
    }
}
