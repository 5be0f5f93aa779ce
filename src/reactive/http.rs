//! HTTP collaborator boundary.
//!
//! The pipeline only ever issues GET requests and looks at the status code
//! and body text, so the boundary is deliberately that narrow. The default
//! implementation wraps a pooled [`reqwest::Client`] and may be shared
//! across widget instances; independent pipelines can call it concurrently.

use async_trait::async_trait;

use crate::reactive::pipeline::FetchError;

/// Status and body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Data source the fetch pipeline talks to.
#[async_trait]
pub trait HttpSource: Send + Sync {
    /// Issue a GET request.
    ///
    /// # Errors
    /// [`FetchError::Network`] on any transport failure. Non-success
    /// status codes are *not* errors at this level; the pipeline decides
    /// what to do with them.
    async fn request(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Default [`HttpSource`] backed by reqwest's pooled client.
#[derive(Debug, Clone)]
pub struct ReqwestSource {
    client: reqwest::Client,
}

impl ReqwestSource {
    /// # Errors
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("skylens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSource for ReqwestSource {
    async fn request(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
