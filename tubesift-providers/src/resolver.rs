//! Resolution orchestrator.
//!
//! Drives a batch of classified entries through their adapter chains,
//! handles the validator cache around authoritative fetches, and folds
//! everything into one [`RunReport`]. Entries are independent: a failure
//! is recorded per entry and never aborts the run.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use tubesift_core::{
    EntryOutcome, EntryProvenance, RecordMerger, RecordSource, RunReport, UrlEntry, UrlKind,
    VideoRecord,
};
use tubesift_fetch::{
    FetchAttempt, FetchContext, FetchError, FetchPayload, FetchSettings, HttpClient, ProxyRotator,
};
use tubesift_store::{RunConfig, StoreError, ValidatorCache};

use crate::registry::AdapterSet;

// ============================================================================
// Resolver
// ============================================================================

/// Batch resolver over a shared fetch context and validator cache.
pub struct Resolver {
    ctx: Arc<FetchContext>,
    cache: Arc<ValidatorCache>,
    adapters: AdapterSet,
    use_api: bool,
    use_cache: bool,
}

impl Resolver {
    /// Builds a resolver from a validated run configuration.
    pub async fn from_config(config: &RunConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let settings = FetchSettings {
            timeout: Duration::from_secs(config.timeout_secs),
            concurrency: config.concurrency,
            ..FetchSettings::default()
        };

        let proxies = Arc::new(ProxyRotator::new(config.proxy_pool.clone()));
        let http = Arc::new(HttpClient::with_proxy_pool(
            proxies.endpoints(),
            settings.timeout,
        ));

        let mut builder = FetchContext::builder()
            .http(http)
            .proxies(proxies)
            .settings(settings);
        if let Some(key) = config.effective_api_key() {
            builder = builder.api_key(key);
        }

        let cache = ValidatorCache::load(&config.cache_path).await;

        Ok(Self {
            ctx: Arc::new(builder.build()),
            cache: Arc::new(cache),
            adapters: AdapterSet::standard(),
            use_api: config.use_authoritative_api,
            use_cache: true,
        })
    }

    /// Builds a resolver from explicit parts. Used by tests and by callers
    /// that manage their own context.
    pub fn with_parts(
        ctx: Arc<FetchContext>,
        cache: Arc<ValidatorCache>,
        adapters: AdapterSet,
        use_api: bool,
    ) -> Self {
        Self {
            ctx,
            cache,
            adapters,
            use_api,
            use_cache: true,
        }
    }

    /// Disables the validator cache for this run.
    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    /// The shared validator cache.
    pub fn cache(&self) -> &Arc<ValidatorCache> {
        &self.cache
    }

    /// Resolves a batch of entries into a merged report.
    ///
    /// Entries run concurrently up to the configured bound; records and
    /// provenance keep the input order regardless of completion order.
    #[instrument(skip(self, entries), fields(entries = entries.len()))]
    pub async fn run(&self, entries: Vec<UrlEntry>) -> RunReport {
        let concurrency = self.ctx.settings.concurrency.max(1);
        info!(concurrency, "Starting resolution run");

        let mut results: Vec<(usize, EntryProvenance, Vec<VideoRecord>)> =
            stream::iter(entries.into_iter().enumerate())
                .map(|(idx, entry)| async move {
                    let (provenance, records) = self.resolve_entry(entry).await;
                    (idx, provenance, records)
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;

        results.sort_by_key(|(idx, _, _)| *idx);

        let mut merger = RecordMerger::new();
        let mut provenance = Vec::with_capacity(results.len());
        for (_, entry_provenance, records) in results {
            merger.extend(records);
            provenance.push(entry_provenance);
        }

        let report = RunReport {
            records: merger.into_records(),
            provenance,
        };
        info!(
            resolved = report.resolved_count(),
            total = report.provenance.len(),
            records = report.records.len(),
            "Resolution run complete"
        );
        report
    }

    /// Resolves one entry to its terminal state.
    async fn resolve_entry(&self, entry: UrlEntry) -> (EntryProvenance, Vec<VideoRecord>) {
        if entry.kind == UrlKind::Unknown {
            debug!(url = %entry.raw, "Unrecognized URL");
            return (
                EntryProvenance {
                    outcome: EntryOutcome::Failed {
                        reason: "unrecognized URL".to_string(),
                    },
                    entry,
                },
                Vec::new(),
            );
        }

        let cache_key = if self.use_cache { entry.cache_key() } else { None };
        let validator = match &cache_key {
            Some(key) => self.cache.validator_for(key).await,
            None => None,
        };

        let chain = self.adapters.chain_for(entry.kind, self.use_api);
        let outcome = chain.execute(&entry, &self.ctx, validator.as_deref()).await;

        match outcome.result {
            Ok(success) => self.finish_resolved(entry, cache_key, success).await,
            Err(error) => {
                let reason = failure_reason(&outcome.attempts, &error);
                (
                    EntryProvenance {
                        outcome: EntryOutcome::Failed { reason },
                        entry,
                    },
                    Vec::new(),
                )
            }
        }
    }

    /// Applies cache policy to a chain success and builds the provenance.
    async fn finish_resolved(
        &self,
        entry: UrlEntry,
        cache_key: Option<String>,
        success: tubesift_fetch::ChainSuccess,
    ) -> (EntryProvenance, Vec<VideoRecord>) {
        match success.payload {
            FetchPayload::NotModified => {
                // The validator we sent came from the cache, so the cached
                // records are current by definition.
                let cached = match &cache_key {
                    Some(key) => self.cache.lookup(key).await,
                    None => None,
                };
                let records = cached.map(|e| e.last_result).unwrap_or_else(|| {
                    warn!(url = %entry.raw, "NotModified without a cached entry");
                    Vec::new()
                });
                (
                    EntryProvenance {
                        outcome: EntryOutcome::Resolved {
                            source: RecordSource::Api,
                            cache_hit: true,
                            record_count: records.len(),
                        },
                        entry,
                    },
                    records,
                )
            }
            FetchPayload::Modified {
                records,
                validator_token,
            } => {
                // Only authoritative results may touch the cache.
                if success.authoritative {
                    if let (Some(key), Some(token)) = (&cache_key, &validator_token) {
                        if let Err(e) = self.cache.store(key, token, records.clone()).await {
                            warn!(key = %key, error = %e, "Failed to persist validator cache");
                        }
                    }
                }
                (
                    EntryProvenance {
                        outcome: EntryOutcome::Resolved {
                            source: success.source,
                            cache_hit: false,
                            record_count: records.len(),
                        },
                        entry,
                    },
                    records,
                )
            }
        }
    }
}

/// Builds a per-entry failure reason from the chain's attempt log.
///
/// The concrete provider messages (yt-dlp stderr, API status lines) carry
/// far more signal than the chain's terminal error, so each adapter's last
/// recorded error is folded into the reason. The terminal error is only
/// used when no attempt left a message (e.g. an empty chain).
fn failure_reason(attempts: &[FetchAttempt], error: &FetchError) -> String {
    let mut parts: Vec<(&str, String)> = Vec::new();
    for attempt in attempts {
        if let Some(message) = &attempt.error {
            // Retries repeat the adapter; keep its last message only.
            match parts.iter().position(|(id, _)| *id == attempt.adapter_id) {
                Some(i) => parts[i].1 = message.clone(),
                None => parts.push((attempt.adapter_id.as_str(), message.clone())),
            }
        }
    }
    if parts.is_empty() {
        error.to_string()
    } else {
        parts
            .iter()
            .map(|(id, message)| format!("{id}: {message}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ============================================================================
// Tests
// ============================================================================
