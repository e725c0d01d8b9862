//! General-purpose scraper fallback via `yt-dlp`.
//!
//! Handles all three URL kinds by shelling out to `yt-dlp -J` in
//! metadata-only mode and normalizing its JSON dump. This is the path of
//! last resort for collections and the fallback for single videos; it is
//! never authoritative and never touches the validator cache.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};
use tubesift_core::{RecordSource, UrlEntry, UrlKind, VideoRecord};
use tubesift_fetch::{
    host::process::commands, FetchContext, FetchError, FetchPayload, ProcessError,
    ProviderAdapter, ProxyEndpoint,
};

/// stderr markers that make a failure permanent rather than transient.
const PERMANENT_MARKERS: &[&str] = &[
    "Video unavailable",
    "This video is not available",
    "Private video",
    "has been removed",
    "available in your country",
    "who has blocked it in your country",
    "This channel does not exist",
];

// ============================================================================
// Scraper Adapter
// ============================================================================

/// Fallback adapter shelling out to `yt-dlp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScraperAdapter;

impl ScraperAdapter {
    /// Creates a new scraper adapter.
    pub fn new() -> Self {
        Self
    }

    fn build_args<'a>(entry: &'a UrlEntry, proxy: &'a ProxyEndpoint) -> Vec<&'a str> {
        let mut args = vec!["-J", "--skip-download", "--ignore-errors"];
        if entry.kind.is_collection() {
            // Flat extraction keeps collection scrapes to one request per
            // entry instead of one per video.
            args.push("--flat-playlist");
        }
        if let Some(url) = proxy.url() {
            args.push("--proxy");
            args.push(url);
        }
        args.push(&entry.raw);
        args
    }

    fn classify_exit(code: i32, stderr: &str) -> FetchError {
        if PERMANENT_MARKERS.iter().any(|m| stderr.contains(m)) {
            return FetchError::Permanent(first_error_line(stderr));
        }
        FetchError::Transient(format!("yt-dlp exited with code {code}: {}", first_error_line(stderr)))
    }
}

/// Picks the most informative stderr line for the failure reason.
fn first_error_line(stderr: &str) -> String {
    stderr
        .lines()
        .find(|l| l.contains("ERROR"))
        .or_else(|| stderr.lines().last())
        .unwrap_or("no stderr")
        .trim()
        .to_string()
}

#[async_trait]
impl ProviderAdapter for ScraperAdapter {
    fn id(&self) -> &str {
        "scraper"
    }

    fn source(&self) -> RecordSource {
        RecordSource::ScraperFallback
    }

    fn supports(&self, kind: UrlKind) -> bool {
        !matches!(kind, UrlKind::Unknown)
    }

    async fn is_available(&self, ctx: &FetchContext) -> bool {
        ctx.process.command_exists(commands::YT_DLP)
    }

    #[instrument(skip(self, ctx, _validator), fields(url = %entry.raw, proxy = %proxy))]
    async fn fetch(
        &self,
        entry: &UrlEntry,
        ctx: &FetchContext,
        proxy: &ProxyEndpoint,
        _validator: Option<&str>,
    ) -> Result<FetchPayload, FetchError> {
        let args = Self::build_args(entry, proxy);
        debug!(args = ?args, "Running extractor");

        let output = ctx
            .process
            .run_with_timeout(commands::YT_DLP, &args, ctx.timeout())
            .await
            .map_err(|e| match e {
                ProcessError::NotFound(_) => {
                    FetchError::NotConfigured("yt-dlp not installed".to_string())
                }
                other => FetchError::Process(other),
            })?;

        if !output.success() {
            warn!(code = output.exit_code, "Extractor failed");
            return Err(Self::classify_exit(output.exit_code, &output.stderr));
        }

        let records = parse_dump(&output.stdout)?;
        info!(records = records.len(), "Scrape complete");
        Ok(FetchPayload::records(records))
    }
}

// ============================================================================
// Dump Parsing
// ============================================================================

/// Parses a `yt-dlp -J` dump into records.
///
/// Collections carry an `entries` array; single videos are a bare object.
/// Null entries (from `--ignore-errors`) are skipped.
pub fn parse_dump(stdout: &str) -> Result<Vec<VideoRecord>, FetchError> {
    let info: serde_json::Value = serde_json::from_str(stdout.trim())?;

    if let Some(entries) = info.get("entries").and_then(|e| e.as_array()) {
        Ok(entries
            .iter()
            .filter(|e| !e.is_null())
            .filter_map(record_from_entry)
            .collect())
    } else {
        Ok(record_from_entry(&info).into_iter().collect())
    }
}

fn record_from_entry(entry: &serde_json::Value) -> Option<VideoRecord> {
    let id = entry.get("id").and_then(|v| v.as_str())?;

    let mut record = VideoRecord::new(id, RecordSource::ScraperFallback);
    record.title = str_field(entry, "title");
    record.duration_seconds = entry
        .get("duration")
        .and_then(serde_json::Value::as_f64)
        .map(|d| d as u64);
    record.view_count = entry.get("view_count").and_then(serde_json::Value::as_u64);
    record.channel_id = str_field(entry, "channel_id");
    record.channel_title = str_field(entry, "channel").or_else(|| str_field(entry, "uploader"));
    record.published_at = str_field(entry, "upload_date").and_then(|d| parse_upload_date(&d));
    record.description = str_field(entry, "description");
    record.raw = entry.clone();
    Some(record)
}

/// Parses the extractor's `YYYYMMDD` upload date as midnight UTC.
fn parse_upload_date(s: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

// ============================================================================
// Tests
// ============================================================================
