//! Validator token cache for authoritative fetches.
//!
//! Each channel or playlist identifier maps to the validator token the
//! authoritative provider returned last time, plus the records fetched
//! alongside it. A matching token on the next run means the cached records
//! can be reused verbatim without spending quota on the full response.
//!
//! Only authoritative fetches mutate the cache; fallback results never
//! overwrite it. The file is rewritten atomically after every mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info};
use tubesift_core::VideoRecord;

use crate::error::StoreError;
use crate::persistence;

// ============================================================================
// Cache Entry
// ============================================================================

/// One cached authoritative result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorCacheEntry {
    /// Opaque validator token, compared only by string equality.
    pub validator_token: String,
    /// The records from the last authoritative fetch.
    pub last_result: Vec<VideoRecord>,
    /// When this entry was last written.
    pub updated_at: DateTime<Utc>,
}

impl ValidatorCacheEntry {
    /// Creates a new entry stamped with the current time.
    pub fn new(validator_token: impl Into<String>, last_result: Vec<VideoRecord>) -> Self {
        Self {
            validator_token: validator_token.into(),
            last_result,
            updated_at: Utc::now(),
        }
    }

    /// Returns true if the given token matches the cached one.
    pub fn is_fresh(&self, new_token: &str) -> bool {
        self.validator_token == new_token
    }
}

// ============================================================================
// Validator Cache
// ============================================================================

/// On-disk validator cache keyed by channel/playlist identifier.
///
/// All mutations go through an interior async lock, so concurrent workers
/// can share one cache behind an `Arc` and writes are serialized.
#[derive(Debug)]
pub struct ValidatorCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, ValidatorCacheEntry>>,
}

impl ValidatorCache {
    /// Creates an empty cache backed by the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Loads the cache from disk. A missing or unparseable file yields an
    /// empty cache with a warning, never an error.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries: HashMap<String, ValidatorCacheEntry> =
            persistence::load_json_or_default(&path).await;
        debug!(path = %path.display(), entries = entries.len(), "Loaded validator cache");
        Self {
            path: path.clone(),
            entries: RwLock::new(entries),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up the cached entry for a key.
    pub async fn lookup(&self, key: &str) -> Option<ValidatorCacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Returns the cached validator token for a key, if any.
    pub async fn validator_for(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .await
            .get(key)
            .map(|e| e.validator_token.clone())
    }

    /// Replaces the entry for a key and persists the cache.
    ///
    /// The per-key replacement and the file rewrite both happen under the
    /// write lock, so a concurrent store can never interleave a partial
    /// state onto disk.
    pub async fn store(
        &self,
        key: &str,
        token: impl Into<String>,
        records: Vec<VideoRecord>,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), ValidatorCacheEntry::new(token, records));
        persistence::save_json(&self.path, &*entries).await?;
        debug!(key = %key, "Stored validator cache entry");
        Ok(())
    }

    /// Persists the current cache contents.
    pub async fn save(&self) -> Result<(), StoreError> {
        let entries = self.entries.read().await;
        persistence::save_json(&self.path, &*entries).await
    }

    /// Removes all entries and persists the empty cache.
    pub async fn clear(&self) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        persistence::save_json(&self.path, &*entries).await?;
        info!(removed, "Cleared validator cache");
        Ok(removed)
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if the cache has no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot of all entries, sorted by key for stable display.
    pub async fn snapshot(&self) -> Vec<(String, ValidatorCacheEntry)> {
        let entries = self.entries.read().await;
        let mut all: Vec<_> = entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

// ============================================================================
// Tests
// ============================================================================
