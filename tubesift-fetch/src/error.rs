//! Fetch error types.
//!
//! The error taxonomy drives the chain's retry and fallback decisions:
//! rate limits are never retried (only fallen back from), transient
//! failures get bounded retries with backoff, permanent failures fail the
//! entry without retry.

use std::time::Duration;
use thiserror::Error;

use tubesift_core::UrlKind;

// ============================================================================
// Failure Class
// ============================================================================

/// How the chain should react to a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Quota or rate limit hit. Retry budget is zero; fall back immediately.
    RateLimited,
    /// Might succeed on retry (network error, timeout, temporary block).
    Transient,
    /// Will not succeed on retry (removed video, geo-block, bad payload).
    Permanent,
}

// ============================================================================
// Main Fetch Error
// ============================================================================

/// Error type for provider fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Rate limited or quota exhausted by the provider.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, when the provider said so.
        retry_after: Option<u64>,
    },

    /// Transient upstream failure worth retrying.
    #[error("Transient failure: {0}")]
    Transient(String),

    /// Permanent upstream failure; retrying cannot help.
    #[error("Permanent failure: {0}")]
    Permanent(String),

    /// Provider returned a payload we could not interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core error.
    #[error("Core error: {0}")]
    Core(#[from] tubesift_core::CoreError),

    /// Subprocess error.
    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    /// The adapter does not handle this URL kind.
    #[error("URL kind not supported by this provider: {0}")]
    Unsupported(UrlKind),

    /// Adapter is not configured (e.g. missing credential).
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// No adapter in the chain could resolve the entry.
    #[error("All providers failed")]
    AllProvidersFailed,
}

impl FetchError {
    /// Classifies this error for retry/fallback policy.
    pub fn class(&self) -> FailureClass {
        match self {
            Self::RateLimited { .. } => FailureClass::RateLimited,
            Self::Timeout(_) | Self::Transient(_) => FailureClass::Transient,
            Self::Http(e) if e.is_timeout() || e.is_connect() => FailureClass::Transient,
            Self::Process(ProcessError::Timeout(_)) => FailureClass::Transient,
            _ => FailureClass::Permanent,
        }
    }

    /// Returns true if a retry against the same provider can help.
    pub fn is_transient(&self) -> bool {
        self.class() == FailureClass::Transient
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type used by the HTTP host.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No client built for the requested proxy endpoint.
    #[error("No client for proxy endpoint: {0}")]
    UnknownProxy(String),
}

impl From<HttpError> for FetchError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Request(e) => FetchError::Http(e),
            other => FetchError::InvalidResponse(other.to_string()),
        }
    }
}

// ============================================================================
// Process Error
// ============================================================================

/// Error type for subprocess operations (the scraper's yt-dlp host).
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Command not found on PATH.
    #[error("Command not found: {0}")]
    NotFound(String),

    /// Command timed out.
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    /// Non-zero exit code.
    #[error("Command exited with code {code}: {stderr}")]
    NonZeroExit {
        /// Exit code from the process.
        code: i32,
        /// Standard error output.
        stderr: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_not_transient() {
        let err = FetchError::RateLimited { retry_after: Some(30) };
        assert_eq!(err.class(), FailureClass::RateLimited);
        assert!(!err.is_transient());
    }

    #[test]
    fn test_timeout_is_transient() {
        assert!(FetchError::Timeout(30).is_transient());
        assert!(FetchError::Transient("connection reset".into()).is_transient());
        assert!(FetchError::Process(ProcessError::Timeout(Duration::from_secs(5))).is_transient());
    }

    #[test]
    fn test_permanent_classes() {
        assert_eq!(
            FetchError::Permanent("video removed".into()).class(),
            FailureClass::Permanent
        );
        assert_eq!(
            FetchError::InvalidResponse("truncated".into()).class(),
            FailureClass::Permanent
        );
        assert_eq!(
            FetchError::Unsupported(UrlKind::SingleVideo).class(),
            FailureClass::Permanent
        );
    }
}
