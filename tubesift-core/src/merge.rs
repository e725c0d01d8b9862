//! Record merger.
//!
//! Collapses heterogeneous provider payloads into one deduplicated,
//! deterministically ordered record list. The merge is field-level: within
//! a group of records for the same video, the highest-priority source's
//! record wins and its missing fields are backfilled from lower-priority
//! records (never whole-record replacement).

use std::collections::HashMap;

use crate::models::VideoRecord;

/// Accumulates records across entries and produces the merged output.
///
/// Ordering: first-seen order of video ids, which preserves both the input
/// entry order and the within-channel ordering of the provider that first
/// listed the channel.
#[derive(Debug, Default)]
pub struct RecordMerger {
    order: Vec<String>,
    by_id: HashMap<String, VideoRecord>,
}

impl RecordMerger {
    /// Creates an empty merger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record, merging against any previous record with the same id.
    pub fn push(&mut self, record: VideoRecord) {
        match self.by_id.get_mut(&record.id) {
            None => {
                self.order.push(record.id.clone());
                self.by_id.insert(record.id.clone(), record);
            }
            Some(existing) => {
                if record.source.priority() > existing.source.priority() {
                    // New record wins; carry over anything it is missing.
                    let mut winner = record;
                    winner.backfill_from(existing);
                    *existing = winner;
                } else {
                    existing.backfill_from(&record);
                }
            }
        }
    }

    /// Adds a batch of records in order.
    pub fn extend(&mut self, records: impl IntoIterator<Item = VideoRecord>) {
        for record in records {
            self.push(record);
        }
    }

    /// Number of distinct videos seen so far.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no records were added.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consumes the merger and returns records in first-seen order.
    pub fn into_records(mut self) -> Vec<VideoRecord> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.remove(id))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordSource;

    fn rec(id: &str, source: RecordSource) -> VideoRecord {
        VideoRecord::new(id, source)
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let mut merger = RecordMerger::new();
        merger.push(rec("b", RecordSource::Api));
        merger.push(rec("a", RecordSource::Api));
        merger.push(rec("c", RecordSource::Api));

        let ids: Vec<_> = merger.into_records().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_higher_priority_wins_with_backfill() {
        let mut low = rec("v", RecordSource::ScraperFallback);
        low.title = Some("scraper title".to_string());
        low.view_count = Some(7);

        let mut high = rec("v", RecordSource::Api);
        high.title = Some("api title".to_string());

        // Lower-priority arrives first; the API record replaces it but
        // inherits the view count it lacked.
        let mut merger = RecordMerger::new();
        merger.push(low);
        merger.push(high);

        let out = merger.into_records();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, RecordSource::Api);
        assert_eq!(out[0].title.as_deref(), Some("api title"));
        assert_eq!(out[0].view_count, Some(7));
    }

    #[test]
    fn test_lower_priority_only_backfills() {
        let mut high = rec("v", RecordSource::Api);
        high.title = Some("api title".to_string());

        let mut low = rec("v", RecordSource::SingleVideoFast);
        low.title = Some("fast title".to_string());
        low.duration_seconds = Some(33);

        let mut merger = RecordMerger::new();
        merger.push(high);
        merger.push(low);

        let out = merger.into_records();
        assert_eq!(out[0].source, RecordSource::Api);
        assert_eq!(out[0].title.as_deref(), Some("api title"));
        assert_eq!(out[0].duration_seconds, Some(33));
    }

    #[test]
    fn test_duplicate_ids_do_not_duplicate_output() {
        let mut merger = RecordMerger::new();
        merger.extend(vec![
            rec("a", RecordSource::Api),
            rec("a", RecordSource::ScraperFallback),
            rec("b", RecordSource::ScraperFallback),
        ]);
        assert_eq!(merger.len(), 2);
    }
}
