//! Per-entry provenance and the run report.

use serde::{Deserialize, Serialize};

use super::record::{RecordSource, VideoRecord};
use super::url::UrlEntry;

// ============================================================================
// Entry Outcome
// ============================================================================

/// Terminal state of one input entry. Every entry ends in exactly one of
/// these; nothing is silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum EntryOutcome {
    /// The entry produced records.
    Resolved {
        /// The provider that satisfied it.
        source: RecordSource,
        /// True when the result came from the validator cache verbatim.
        cache_hit: bool,
        /// How many records the entry contributed.
        record_count: usize,
    },
    /// The entry could not be resolved.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}

impl EntryOutcome {
    /// Returns true if the entry resolved.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Provenance for one input entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryProvenance {
    /// The classified entry.
    pub entry: UrlEntry,
    /// How it ended.
    pub outcome: EntryOutcome,
}

// ============================================================================
// Run Report
// ============================================================================

/// The merged output of one run: canonical records in first-seen order plus
/// per-entry provenance. Built fresh each run, handed to the output sinks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Deduplicated records, ordered by first-seen input entry.
    pub records: Vec<VideoRecord>,
    /// One provenance row per input entry, in input order.
    pub provenance: Vec<EntryProvenance>,
}

impl RunReport {
    /// Number of entries that resolved.
    pub fn resolved_count(&self) -> usize {
        self.provenance
            .iter()
            .filter(|p| p.outcome.is_resolved())
            .count()
    }

    /// Per-entry failures, as `(url, reason)` pairs.
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.provenance
            .iter()
            .filter_map(|p| match &p.outcome {
                EntryOutcome::Failed { reason } => Some((p.entry.raw.as_str(), reason.as_str())),
                EntryOutcome::Resolved { .. } => None,
            })
            .collect()
    }

    /// True when every entry resolved.
    pub fn all_resolved(&self) -> bool {
        self.provenance.iter().all(|p| p.outcome.is_resolved())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::url::UrlEntry;

    fn resolved(url: &str) -> EntryProvenance {
        EntryProvenance {
            entry: UrlEntry::new(url),
            outcome: EntryOutcome::Resolved {
                source: RecordSource::Api,
                cache_hit: false,
                record_count: 1,
            },
        }
    }

    fn failed(url: &str, reason: &str) -> EntryProvenance {
        EntryProvenance {
            entry: UrlEntry::new(url),
            outcome: EntryOutcome::Failed {
                reason: reason.to_string(),
            },
        }
    }

    #[test]
    fn test_report_counts() {
        let report = RunReport {
            records: vec![],
            provenance: vec![
                resolved("https://youtu.be/a"),
                failed("nonsense", "unrecognized URL"),
            ],
        };

        assert_eq!(report.resolved_count(), 1);
        assert!(!report.all_resolved());
        assert_eq!(report.failures(), vec![("nonsense", "unrecognized URL")]);
    }
}
