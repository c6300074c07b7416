//! Network fetch seam.
//!
//! Strategies talk to the network through the [`Fetcher`] trait so the
//! transport can be swapped out in tests. [`HttpFetcher`] is the real
//! implementation on top of reqwest.
//!
//! A transport failure (offline, DNS, timeout) is an `Err`; an HTTP
//! response with any status is `Ok` — strategies decide whether such a
//! response is cacheable or merely returnable.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use haven_core::{CacheRequest, CachedResponse, Error, ResponseKind};
use reqwest::Client;
use url::Url;

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "haven/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "haven/0.1".to_string(), timeout: Duration::from_millis(20_000) }
    }
}

/// Transport abstraction used by strategies and the lifecycle manager.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the network fetch for a request.
    ///
    /// `Err` means the transport failed outright; `Ok` carries whatever
    /// the server answered, success status or not.
    async fn fetch(&self, request: &CacheRequest) -> Result<CachedResponse, Error>;
}

/// HTTP fetch client backed by reqwest.
pub struct HttpFetcher {
    http: Client,
    page_origin: Url,
}

impl HttpFetcher {
    /// Create a new fetch client with the given configuration.
    ///
    /// `page_origin` decides whether a response is classified as basic
    /// (same-origin, readable) or opaque (cross-origin).
    pub fn new(config: FetchConfig, page_origin: Url) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::FetchFailed(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, page_origin })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &CacheRequest) -> Result<CachedResponse, Error> {
        let start = Instant::now();

        let mut builder = self.http.get(request.url.as_str());
        if let Some(accept) = &request.accept {
            builder = builder.header("Accept", accept);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::FetchFailed(format!("network error: {}", e)))?;

        let status = response.status().as_u16();
        let kind = if response.url().origin() == self.page_origin.origin() {
            ResponseKind::Basic
        } else {
            ResponseKind::Opaque
        };

        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::FetchFailed(format!("failed to read response: {}", e)))?;

        tracing::debug!(
            url = %request.url,
            status,
            kind = kind.as_str(),
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        Ok(CachedResponse { status, kind, headers, body: bytes })
    }
}
