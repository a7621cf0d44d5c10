//! Request executor trait.

use async_trait::async_trait;

use crate::Result;
use crate::transport::{ApiRequest, ApiResponse};

/// Executes requests against the provider.
///
/// Implementations return every HTTP response, including 4xx/5xx, as
/// `Ok`; `Err` is reserved for requests that never got a response.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: RequestExecutor + ?Sized> RequestExecutor for std::sync::Arc<T> {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        (**self).execute(request).await
    }
}
