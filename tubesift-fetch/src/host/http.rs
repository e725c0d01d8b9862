//! HTTP client with per-proxy connection pools.
//!
//! `reqwest` fixes the proxy at client-build time, so the host pre-builds
//! one client per configured proxy endpoint plus a direct client, and the
//! caller selects among them with the [`ProxyEndpoint`] handed out by the
//! rotator. A proxy URL that fails to parse is logged and skipped; its
//! requests fall back to the direct client.

use reqwest::{header, header::HeaderMap, Client, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::HttpError;
use crate::proxy::ProxyEndpoint;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for TubeSift.
const USER_AGENT: &str = concat!("TubeSift/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and proxy selection.
#[derive(Debug, Clone)]
pub struct HttpClient {
    direct: Client,
    by_proxy: HashMap<String, Client>,
}

impl HttpClient {
    /// Creates a client with no proxy pool and the default timeout.
    pub fn new() -> Self {
        Self::with_proxy_pool(&[], Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with one connection pool per proxy endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the direct client cannot be built, which only happens when
    /// the system TLS configuration is fundamentally broken.
    pub fn with_proxy_pool(proxies: &[String], timeout: Duration) -> Self {
        let direct = Self::builder(timeout).build().unwrap_or_else(|e| {
            panic!(
                "Failed to create HTTP client: {e}. \
                This usually indicates a broken TLS/SSL configuration."
            )
        });

        let mut by_proxy = HashMap::new();
        for url in proxies {
            match reqwest::Proxy::all(url) {
                Ok(proxy) => match Self::builder(timeout).proxy(proxy).build() {
                    Ok(client) => {
                        by_proxy.insert(url.clone(), client);
                    }
                    Err(e) => {
                        warn!(proxy = %url, error = %e, "Failed to build proxied client, skipping");
                    }
                },
                Err(e) => {
                    warn!(proxy = %url, error = %e, "Failed to parse proxy URL, skipping");
                }
            }
        }

        Self { direct, by_proxy }
    }

    fn builder(timeout: Duration) -> reqwest::ClientBuilder {
        Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(USER_AGENT)
    }

    /// Selects the client for an endpoint, falling back to direct for
    /// proxies that could not be built.
    fn client_for(&self, proxy: &ProxyEndpoint) -> &Client {
        match proxy {
            ProxyEndpoint::Direct => &self.direct,
            ProxyEndpoint::Proxy(url) => self.by_proxy.get(url).unwrap_or(&self.direct),
        }
    }

    /// Performs a GET request through the given egress endpoint.
    #[instrument(skip(self), fields(url = %url, proxy = %proxy))]
    pub async fn get(&self, url: &str, proxy: &ProxyEndpoint) -> Result<Response, HttpError> {
        debug!("GET request");
        let response = self.client_for(proxy).get(url).send().await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }

    /// Performs a GET request with custom headers (e.g. `If-None-Match`).
    #[instrument(skip(self, headers), fields(url = %url, proxy = %proxy))]
    pub async fn get_with_headers(
        &self,
        url: &str,
        proxy: &ProxyEndpoint,
        headers: HeaderMap,
    ) -> Result<Response, HttpError> {
        debug!("GET request with headers");
        let response = self.client_for(proxy).get(url).headers(headers).send().await?;
        debug!(status = %response.status(), "Response received");
        Ok(response)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// Check if the response indicates rate limiting.
    fn is_rate_limited(&self) -> bool;

    /// Get the Retry-After header value in seconds.
    fn retry_after_secs(&self) -> Option<u64>;

    /// Get the ETag header value, used as the opaque validator token.
    fn etag(&self) -> Option<String>;
}

impl ResponseExt for Response {
    fn is_rate_limited(&self) -> bool {
        self.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
    }

    fn retry_after_secs(&self) -> Option<u64> {
        self.headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    fn etag(&self) -> Option<String> {
        self.headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

// ============================================================================
// Tests
// ============================================================================
