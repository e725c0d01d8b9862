//! Fetch context providing access to host APIs.
//!
//! The fetch context is passed to all provider adapters and provides unified
//! access to system resources like the HTTP client, process runner, and the
//! proxy rotator, plus run-wide state such as the quota exhaustion flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::host::{http::HttpClient, process::ProcessRunner};
use crate::proxy::ProxyRotator;

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for fetch operations.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Timeout for fetch operations.
    pub timeout: Duration,
    /// Maximum attempts per adapter on transient failures.
    pub max_attempts: u32,
    /// Base delay for the exponential backoff schedule.
    pub base_delay: Duration,
    /// Maximum number of entries resolved concurrently.
    pub concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            concurrency: 4,
        }
    }
}

impl FetchSettings {
    /// Creates settings with custom timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Creates settings with a custom per-adapter attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Context provided to provider adapters, giving access to host APIs.
///
/// The context bundles everything adapters might need:
/// - HTTP client with per-proxy connection pools
/// - Process runner for extractor tools
/// - Proxy rotator handing out egress endpoints
/// - The authoritative API credential, if configured
/// - A run-wide quota exhaustion flag
pub struct FetchContext {
    /// HTTP client with tracing.
    pub http: Arc<HttpClient>,
    /// Process runner for extractor tools.
    pub process: Arc<ProcessRunner>,
    /// Round-robin egress endpoint rotator.
    pub proxies: Arc<ProxyRotator>,
    /// Fetch settings.
    pub settings: FetchSettings,
    /// Credential for the authoritative metadata API.
    pub api_key: Option<String>,
    /// Latches once the authoritative API reports quota exhaustion.
    quota_exhausted: AtomicBool,
}

impl FetchContext {
    /// Creates a new fetch context with default host API implementations.
    pub fn new() -> Self {
        Self::with_settings(FetchSettings::default())
    }

    /// Creates a context with custom settings.
    pub fn with_settings(settings: FetchSettings) -> Self {
        Self {
            http: Arc::new(HttpClient::new()),
            process: Arc::new(ProcessRunner::new()),
            proxies: Arc::new(ProxyRotator::direct()),
            settings,
            api_key: None,
            quota_exhausted: AtomicBool::new(false),
        }
    }

    /// Creates a builder for customizing the context.
    pub fn builder() -> FetchContextBuilder {
        FetchContextBuilder::new()
    }

    /// Returns the effective timeout for fetch operations.
    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    /// Returns true if the authoritative API has exhausted its quota
    /// during this run.
    pub fn is_quota_exhausted(&self) -> bool {
        self.quota_exhausted.load(Ordering::Relaxed)
    }

    /// Marks the authoritative API quota as exhausted for the rest of
    /// the run. The flag never resets within a run.
    pub fn mark_quota_exhausted(&self) {
        self.quota_exhausted.store(true, Ordering::Relaxed);
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("settings", &self.settings)
            .field("has_api_key", &self.api_key.is_some())
            .field("proxies", &self.proxies.len())
            .field("quota_exhausted", &self.is_quota_exhausted())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
pub struct FetchContextBuilder {
    http: Option<Arc<HttpClient>>,
    process: Option<Arc<ProcessRunner>>,
    proxies: Option<Arc<ProxyRotator>>,
    settings: FetchSettings,
    api_key: Option<String>,
}

impl FetchContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            http: None,
            process: None,
            proxies: None,
            settings: FetchSettings::default(),
            api_key: None,
        }
    }

    /// Sets the HTTP client.
    pub fn http(mut self, http: Arc<HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Sets the process runner.
    pub fn process(mut self, process: Arc<ProcessRunner>) -> Self {
        self.process = Some(process);
        self
    }

    /// Sets the proxy rotator.
    pub fn proxies(mut self, proxies: Arc<ProxyRotator>) -> Self {
        self.proxies = Some(proxies);
        self
    }

    /// Sets the fetch settings.
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Sets the authoritative API credential.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> FetchContext {
        let proxies = self
            .proxies
            .unwrap_or_else(|| Arc::new(ProxyRotator::direct()));
        let http = self.http.unwrap_or_else(|| {
            Arc::new(HttpClient::with_proxy_pool(
                proxies.endpoints(),
                self.settings.timeout,
            ))
        });

        FetchContext {
            http,
            process: self.process.unwrap_or_else(|| Arc::new(ProcessRunner::new())),
            proxies,
            settings: self.settings,
            api_key: self.api_key,
            quota_exhausted: AtomicBool::new(false),
        }
    }
}

impl Default for FetchContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = FetchContext::builder()
            .timeout(Duration::from_secs(60))
            .api_key("k")
            .build();

        assert_eq!(ctx.settings.timeout, Duration::from_secs(60));
        assert_eq!(ctx.api_key.as_deref(), Some("k"));
        assert!(ctx.proxies.is_empty());
    }

    #[test]
    fn test_default_context() {
        let ctx = FetchContext::new();
        assert_eq!(ctx.settings.timeout, Duration::from_secs(120));
        assert!(ctx.api_key.is_none());
        assert!(!ctx.is_quota_exhausted());
    }

    #[test]
    fn test_quota_flag_latches() {
        let ctx = FetchContext::new();
        assert!(!ctx.is_quota_exhausted());
        ctx.mark_quota_exhausted();
        assert!(ctx.is_quota_exhausted());
        ctx.mark_quota_exhausted();
        assert!(ctx.is_quota_exhausted());
    }
}
