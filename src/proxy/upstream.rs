//! Outbound HTTP to the upstream APIs.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::error::{ProxyError, Result};

const USER_AGENT: &str = concat!("cache_proxy/", env!("CARGO_PKG_VERSION"));

/// Status and body of an upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Bytes,
}

// == Upstream Client Trait ==
/// Issues a single GET. No retries; failures surface immediately.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn get(&self, url: &Url) -> Result<UpstreamResponse>;
}

// == HTTP Upstream ==
/// [`UpstreamClient`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http: reqwest::Client,
}

impl HttpUpstream {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| ProxyError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn get(&self, url: &Url) -> Result<UpstreamResponse> {
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(UpstreamResponse { status, body })
    }
}

// reqwest errors carry the full URL, which includes the api key.
fn transport_error(err: reqwest::Error) -> ProxyError {
    let err = err.without_url();
    if err.is_timeout() {
        ProxyError::UpstreamTransport(format!("timeout: {}", err))
    } else {
        ProxyError::UpstreamTransport(err.to_string())
    }
}
