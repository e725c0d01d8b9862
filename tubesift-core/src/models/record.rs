//! Canonical video records.
//!
//! Every provider payload is normalized into a [`VideoRecord`] before
//! merging. Two records with the same `id` are the same video; all other
//! fields are optional and filled in best-effort per provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Record Source
// ============================================================================

/// Which provider produced a record.
///
/// The order here is the merge priority: `Api` beats `ScraperFallback`
/// beats `SingleVideoFast` when records for the same video collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// The quota-metered Data API (authoritative).
    Api,
    /// The general-purpose scraper fallback.
    ScraperFallback,
    /// The lightweight single-video fast path.
    SingleVideoFast,
}

impl RecordSource {
    /// Merge priority, higher wins.
    pub fn priority(&self) -> u32 {
        match self {
            Self::Api => 100,
            Self::ScraperFallback => 50,
            Self::SingleVideoFast => 10,
        }
    }

    /// Returns the display name for this source.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::ScraperFallback => "scraper",
            Self::SingleVideoFast => "fast-video",
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Video Record
// ============================================================================

/// The canonical, provider-independent metadata record for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// Stable video identifier; the dedup key.
    pub id: String,
    /// Video title.
    pub title: Option<String>,
    /// Duration in seconds.
    pub duration_seconds: Option<u64>,
    /// View count at fetch time.
    pub view_count: Option<u64>,
    /// Owning channel id.
    pub channel_id: Option<String>,
    /// Owning channel display name.
    pub channel_title: Option<String>,
    /// Publish timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Description, possibly truncated by the provider.
    pub description: Option<String>,
    /// Which provider produced this record.
    pub source: RecordSource,
    /// The raw provider payload, kept opaque for downstream consumers.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

impl VideoRecord {
    /// Creates a record with only the id and source set.
    pub fn new(id: impl Into<String>, source: RecordSource) -> Self {
        Self {
            id: id.into(),
            title: None,
            duration_seconds: None,
            view_count: None,
            channel_id: None,
            channel_title: None,
            published_at: None,
            description: None,
            source,
            raw: serde_json::Value::Null,
        }
    }

    /// Backfills every `None` field of `self` from `other`.
    ///
    /// Field-level merge: `self` keeps everything it has; only missing
    /// fields are taken from the lower-priority record. `source` and `raw`
    /// stay those of `self`.
    pub fn backfill_from(&mut self, other: &VideoRecord) {
        debug_assert_eq!(self.id, other.id);
        if self.title.is_none() {
            self.title = other.title.clone();
        }
        if self.duration_seconds.is_none() {
            self.duration_seconds = other.duration_seconds;
        }
        if self.view_count.is_none() {
            self.view_count = other.view_count;
        }
        if self.channel_id.is_none() {
            self.channel_id = other.channel_id.clone();
        }
        if self.channel_title.is_none() {
            self.channel_title = other.channel_title.clone();
        }
        if self.published_at.is_none() {
            self.published_at = other.published_at;
        }
        if self.description.is_none() {
            self.description = other.description.clone();
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
    fn test_source_priority_order() {
        assert!(RecordSource::Api.priority() > RecordSource::ScraperFallback.priority());
        assert!(RecordSource::ScraperFallback.priority() > RecordSource::SingleVideoFast.priority());
    }

    #[test]
    fn test_backfill_keeps_existing_fields() {
        let mut high = VideoRecord::new("v1", RecordSource::Api);
        high.title = Some("api title".to_string());

        let mut low = VideoRecord::new("v1", RecordSource::ScraperFallback);
        low.title = Some("scraper title".to_string());
        low.view_count = Some(42);

        high.backfill_from(&low);
        assert_eq!(high.title.as_deref(), Some("api title"));
        assert_eq!(high.view_count, Some(42));
        assert_eq!(high.source, RecordSource::Api);
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let mut rec = VideoRecord::new("abc", RecordSource::SingleVideoFast);
        rec.duration_seconds = Some(120);

        let json = serde_json::to_string(&rec).unwrap();
        let back: VideoRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
        // null raw payload is not serialized
        assert!(!json.contains("\"raw\""));
    }
}
