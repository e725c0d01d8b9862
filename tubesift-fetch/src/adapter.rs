//! Provider adapter trait and types.
//!
//! An adapter represents one method of resolving a URL entry into metadata
//! records. Each URL kind has an ordered chain of adapters that are tried
//! in sequence until one succeeds.

use async_trait::async_trait;
use tubesift_core::{RecordSource, UrlEntry, UrlKind, VideoRecord};

use crate::context::FetchContext;
use crate::error::FetchError;
use crate::proxy::ProxyEndpoint;

// ============================================================================
// Fetch Payload
// ============================================================================

/// The successful outcome of an adapter fetch.
#[derive(Debug, Clone)]
pub enum FetchPayload {
    /// The provider returned fresh records, possibly with a new validator
    /// token for conditional revalidation next run.
    Modified {
        /// The fetched metadata records.
        records: Vec<VideoRecord>,
        /// Opaque validator token (e.g. an HTTP ETag), when the provider
        /// supports conditional requests.
        validator_token: Option<String>,
    },
    /// The provider confirmed the cached content is still current.
    NotModified,
}

impl FetchPayload {
    /// Creates a `Modified` payload without a validator token.
    pub fn records(records: Vec<VideoRecord>) -> Self {
        Self::Modified {
            records,
            validator_token: None,
        }
    }

    /// Number of records carried, zero for `NotModified`.
    pub fn record_count(&self) -> usize {
        match self {
            Self::Modified { records, .. } => records.len(),
            Self::NotModified => 0,
        }
    }
}

// ============================================================================
// Provider Adapter Trait
// ============================================================================

/// A method of resolving a URL entry into metadata records.
///
/// Adapters are tried in chain order by [`crate::chain::ProviderChain`].
/// Each fetch receives the egress endpoint chosen by the rotator and the
/// cached validator token for the entry, if any.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Unique identifier for this adapter (e.g. "data_api", "scraper").
    fn id(&self) -> &str;

    /// The record source this adapter produces, which determines merge
    /// priority downstream.
    fn source(&self) -> RecordSource;

    /// Human-readable name for this adapter.
    fn display_name(&self) -> String {
        format!("{} ({})", self.id(), self.source().display_name())
    }

    /// Returns true if this adapter can handle the given URL kind.
    fn supports(&self, kind: UrlKind) -> bool;

    /// Returns true for adapters whose results are authoritative: their
    /// validator tokens are cached and their rate limit responses latch
    /// the run-wide quota flag.
    fn is_authoritative(&self) -> bool {
        false
    }

    /// Check if this adapter is currently usable.
    ///
    /// This should be a quick local check, such as whether a credential
    /// is configured or an extractor binary is installed.
    async fn is_available(&self, ctx: &FetchContext) -> bool {
        let _ = ctx;
        true
    }

    /// Resolve the entry into metadata records.
    async fn fetch(
        &self,
        entry: &UrlEntry,
        ctx: &FetchContext,
        proxy: &ProxyEndpoint,
        validator: Option<&str>,
    ) -> Result<FetchPayload, FetchError>;
}

// ============================================================================
// Adapter Info
// ============================================================================

/// Information about an adapter (for reporting).
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    /// Adapter ID.
    pub id: String,
    /// The record source it produces.
    pub source: RecordSource,
    /// Whether the adapter is currently usable.
    pub available: bool,
    /// Whether its results are authoritative.
    pub authoritative: bool,
}

impl AdapterInfo {
    /// Creates adapter info from an adapter implementation.
    pub async fn from_adapter(adapter: &dyn ProviderAdapter, ctx: &FetchContext) -> Self {
        Self {
            id: adapter.id().to_string(),
            source: adapter.source(),
            available: adapter.is_available(ctx).await,
            authoritative: adapter.is_authoritative(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_record_count() {
        assert_eq!(FetchPayload::NotModified.record_count(), 0);
        let payload = FetchPayload::records(vec![VideoRecord::new(
            "abc123",
            RecordSource::Api,
        )]);
        assert_eq!(payload.record_count(), 1);
    }
}
