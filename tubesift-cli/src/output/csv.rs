//! Flat CSV export of the canonical records.

use std::path::Path;

use anyhow::Result;
use tubesift_core::VideoRecord;

/// Column order of the export. Fixed so downstream spreadsheets stay stable.
const HEADERS: [&str; 8] = [
    "id",
    "title",
    "channel_id",
    "channel_title",
    "duration_seconds",
    "view_count",
    "published_at",
    "source",
];

/// Writes the records as CSV, one row per video.
pub fn write_records(records: &[VideoRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record(record_row(record))?;
    }
    writer.flush()?;
    Ok(())
}

fn record_row(record: &VideoRecord) -> [String; 8] {
    [
        record.id.clone(),
        record.title.clone().unwrap_or_default(),
        record.channel_id.clone().unwrap_or_default(),
        record.channel_title.clone().unwrap_or_default(),
        record
            .duration_seconds
            .map(|d| d.to_string())
            .unwrap_or_default(),
        record
            .view_count
            .map(|v| v.to_string())
            .unwrap_or_default(),
        record
            .published_at
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default(),
        record.source.to_string(),
    ]
}

// ============================================================================
// Tests
// ============================================================================
