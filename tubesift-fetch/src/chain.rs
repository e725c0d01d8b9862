//! Provider chain for executing adapters in order.
//!
//! The chain takes an ordered list of provider adapters and executes them
//! in sequence until one succeeds. Transient failures are retried on the
//! same adapter with backoff before falling through; rate limits and
//! permanent failures fall through immediately.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use tubesift_core::{RecordSource, UrlEntry};

use crate::adapter::{FetchPayload, ProviderAdapter};
use crate::context::FetchContext;
use crate::error::{FailureClass, FetchError};
use crate::retry::RetryPolicy;

// ============================================================================
// Fetch Attempt
// ============================================================================

/// Record of a single fetch attempt.
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    /// The adapter ID that was attempted.
    pub adapter_id: String,
    /// The record source the adapter produces.
    pub source: RecordSource,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// Error if the attempt failed.
    pub error: Option<String>,
    /// How long the attempt took.
    pub duration: Duration,
}

impl FetchAttempt {
    /// Creates a successful attempt record.
    pub fn success(adapter_id: impl Into<String>, source: RecordSource, duration: Duration) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            source,
            success: true,
            error: None,
            duration,
        }
    }

    /// Creates a failed attempt record.
    pub fn failure(
        adapter_id: impl Into<String>,
        source: RecordSource,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            source,
            success: false,
            error: Some(error.into()),
            duration,
        }
    }
}

// ============================================================================
// Chain Outcome
// ============================================================================

/// A successful chain execution.
#[derive(Debug, Clone)]
pub struct ChainSuccess {
    /// The payload produced by the winning adapter.
    pub payload: FetchPayload,
    /// The adapter that succeeded.
    pub adapter_id: String,
    /// The record source it produces.
    pub source: RecordSource,
    /// True if the winning adapter is authoritative.
    pub authoritative: bool,
}

/// The outcome of a chain execution.
#[derive(Debug)]
pub struct ChainOutcome {
    /// The result (success or final error).
    pub result: Result<ChainSuccess, FetchError>,
    /// All attempts made, including retries.
    pub attempts: Vec<FetchAttempt>,
    /// Total duration of all attempts.
    pub duration: Duration,
}

impl ChainOutcome {
    /// Returns true if the chain succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the number of attempts made.
    pub fn attempts_count(&self) -> usize {
        self.attempts.len()
    }

    /// Returns the successful adapter ID, if any.
    pub fn successful_adapter(&self) -> Option<&str> {
        self.result.as_ref().ok().map(|r| r.adapter_id.as_str())
    }

    /// Returns all errors that occurred.
    pub fn errors(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter_map(|a| a.error.as_deref())
            .collect()
    }
}

// ============================================================================
// Provider Chain
// ============================================================================

/// An ordered chain of provider adapters for one URL kind.
///
/// Adapters run in the order they were added. An adapter is skipped when
/// it reports unavailable, and authoritative adapters are also skipped
/// once the run-wide quota flag is set. Within one adapter, transient
/// failures consume the retry budget with backoff; any other failure
/// falls through to the next adapter.
pub struct ProviderChain {
    adapters: Vec<Arc<dyn ProviderAdapter>>,
}

impl ProviderChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Creates a chain with the given adapters, tried in order.
    pub fn with_adapters(adapters: Vec<Arc<dyn ProviderAdapter>>) -> Self {
        Self { adapters }
    }

    /// Appends an adapter to the chain.
    pub fn add_adapter(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.push(adapter);
    }

    /// Returns the number of adapters in the chain.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Returns true if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Returns information about all adapters.
    pub async fn adapter_info(&self, ctx: &FetchContext) -> Vec<crate::adapter::AdapterInfo> {
        let mut info = Vec::with_capacity(self.adapters.len());
        for adapter in &self.adapters {
            info.push(crate::adapter::AdapterInfo::from_adapter(adapter.as_ref(), ctx).await);
        }
        info
    }

    /// Execute the chain for one entry, trying adapters in order.
    ///
    /// The `validator` is the cached validator token for this entry, passed
    /// to adapters that support conditional requests.
    #[instrument(skip(self, ctx, validator), fields(url = %entry.raw, adapters = self.adapters.len()))]
    pub async fn execute(
        &self,
        entry: &UrlEntry,
        ctx: &FetchContext,
        validator: Option<&str>,
    ) -> ChainOutcome {
        let start = Instant::now();
        let mut attempts = Vec::new();

        if self.adapters.is_empty() {
            return ChainOutcome {
                result: Err(FetchError::NotConfigured(
                    "No adapters configured".to_string(),
                )),
                attempts,
                duration: start.elapsed(),
            };
        }

        info!(count = self.adapters.len(), kind = %entry.kind, "Executing provider chain");

        let policy = RetryPolicy::new(ctx.settings.max_attempts)
            .with_base_delay(ctx.settings.base_delay.as_millis() as u64);

        for adapter in &self.adapters {
            let adapter_id = adapter.id();
            let source = adapter.source();

            if adapter.is_authoritative() && ctx.is_quota_exhausted() {
                debug!(adapter = %adapter_id, "Quota exhausted this run, skipping");
                attempts.push(FetchAttempt::failure(
                    adapter_id,
                    source,
                    "Quota exhausted",
                    Duration::ZERO,
                ));
                continue;
            }

            if !adapter.is_available(ctx).await {
                debug!(adapter = %adapter_id, "Adapter not available, skipping");
                attempts.push(FetchAttempt::failure(
                    adapter_id,
                    source,
                    "Not available",
                    Duration::ZERO,
                ));
                continue;
            }

            match self
                .run_adapter(adapter.as_ref(), entry, ctx, validator, &policy, &mut attempts)
                .await
            {
                Ok(payload) => {
                    return ChainOutcome {
                        result: Ok(ChainSuccess {
                            payload,
                            adapter_id: adapter_id.to_string(),
                            source,
                            authoritative: adapter.is_authoritative(),
                        }),
                        attempts,
                        duration: start.elapsed(),
                    };
                }
                Err(error) => {
                    if adapter.is_authoritative()
                        && error.class() == FailureClass::RateLimited
                    {
                        warn!(adapter = %adapter_id, "Authoritative provider rate limited, latching quota flag");
                        ctx.mark_quota_exhausted();
                    }
                    // Fall through to the next adapter.
                }
            }
        }

        warn!(url = %entry.raw, "All providers failed");
        ChainOutcome {
            result: Err(FetchError::AllProvidersFailed),
            attempts,
            duration: start.elapsed(),
        }
    }

    /// Runs one adapter with its retry budget, recording every attempt.
    async fn run_adapter(
        &self,
        adapter: &dyn ProviderAdapter,
        entry: &UrlEntry,
        ctx: &FetchContext,
        validator: Option<&str>,
        policy: &RetryPolicy,
        attempts: &mut Vec<FetchAttempt>,
    ) -> Result<FetchPayload, FetchError> {
        let adapter_id = adapter.id();
        let source = adapter.source();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let proxy = ctx.proxies.next();
            let attempt_start = Instant::now();
            debug!(adapter = %adapter_id, attempt, proxy = %proxy, "Executing adapter");

            match adapter.fetch(entry, ctx, &proxy, validator).await {
                Ok(payload) => {
                    let duration = attempt_start.elapsed();
                    info!(
                        adapter = %adapter_id,
                        records = payload.record_count(),
                        duration = ?duration,
                        "Adapter succeeded"
                    );
                    attempts.push(FetchAttempt::success(adapter_id, source, duration));
                    return Ok(payload);
                }
                Err(error) => {
                    let duration = attempt_start.elapsed();
                    warn!(
                        adapter = %adapter_id,
                        attempt,
                        error = %error,
                        class = ?error.class(),
                        duration = ?duration,
                        "Adapter attempt failed"
                    );
                    attempts.push(FetchAttempt::failure(
                        adapter_id,
                        source,
                        error.to_string(),
                        duration,
                    ));

                    // Only transient failures consume the retry budget.
                    if error.is_transient() && policy.allows_retry(attempt) {
                        let delay = policy.delay_for_attempt(attempt);
                        debug!(adapter = %adapter_id, delay = ?delay, "Retrying after backoff");
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    return Err(error);
                }
            }
        }
    }
}

impl Default for ProviderChain {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
