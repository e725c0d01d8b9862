//! JSON report output.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tubesift_core::{EntryOutcome, RunReport, VideoRecord};

// ============================================================================
// Output Types
// ============================================================================

/// Top-level JSON report.
///
/// Derived entirely from the run report, so an unchanged re-run (every
/// entry a cache hit) serializes to identical bytes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput {
    pub total_entries: usize,
    pub resolved_entries: usize,
    pub total_records: usize,
    pub records: Vec<RecordOutput>,
    pub entries: Vec<EntryOutput>,
}

/// One canonical video record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordOutput {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: String,
}

/// Per-entry provenance row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryOutput {
    pub url: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Conversion
// ============================================================================

fn record_to_output(record: &VideoRecord) -> RecordOutput {
    RecordOutput {
        id: record.id.clone(),
        title: record.title.clone(),
        duration_seconds: record.duration_seconds,
        view_count: record.view_count,
        channel_id: record.channel_id.clone(),
        channel_title: record.channel_title.clone(),
        published_at: record.published_at.as_ref().map(DateTime::<Utc>::to_rfc3339),
        description: record.description.clone(),
        source: record.source.to_string(),
    }
}

/// Builds the serializable report from a run.
pub fn report_to_output(report: &RunReport) -> ReportOutput {
    let entries = report
        .provenance
        .iter()
        .map(|p| {
            let (state, source, cache_hit, record_count, error) = match &p.outcome {
                EntryOutcome::Resolved {
                    source,
                    cache_hit,
                    record_count,
                } => (
                    "resolved".to_string(),
                    Some(source.to_string()),
                    Some(*cache_hit),
                    Some(*record_count),
                    None,
                ),
                EntryOutcome::Failed { reason } => {
                    ("failed".to_string(), None, None, None, Some(reason.clone()))
                }
            };
            EntryOutput {
                url: p.entry.raw.clone(),
                kind: p.entry.kind.to_string(),
                label: p.entry.label.clone(),
                state,
                source,
                cache_hit,
                record_count,
                error,
            }
        })
        .collect();

    ReportOutput {
        total_entries: report.provenance.len(),
        resolved_entries: report.resolved_count(),
        total_records: report.records.len(),
        records: report.records.iter().map(record_to_output).collect(),
        entries,
    }
}

/// Writes the full report as pretty-printed JSON.
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let output = report_to_output(report);
    let json = serde_json::to_string_pretty(&output)?;
    std::fs::write(path, json)?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
