//! Fast single-video metadata path.
//!
//! Fetches the watch page over plain HTTP through the rotated proxy and
//! extracts the embedded player-response JSON. Much lighter than spawning
//! the scraper for one video, but brittle against page layout changes, so
//! any failure here simply falls through to the scraper.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;
use tracing::{debug, info, instrument};
use tubesift_core::{RecordSource, UrlEntry, UrlKind, VideoRecord};
use tubesift_fetch::{
    FetchContext, FetchError, FetchPayload, ProviderAdapter, ProxyEndpoint,
};

const PLAYER_RESPONSE_MARKER: &str = "var ytInitialPlayerResponse = ";

// ============================================================================
// Fast Video Adapter
// ============================================================================

/// Watch-page adapter for single videos.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastVideoAdapter;

impl FastVideoAdapter {
    /// Creates a new fast video adapter.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProviderAdapter for FastVideoAdapter {
    fn id(&self) -> &str {
        "fast_video"
    }

    fn source(&self) -> RecordSource {
        RecordSource::SingleVideoFast
    }

    fn supports(&self, kind: UrlKind) -> bool {
        kind == UrlKind::SingleVideo
    }

    #[instrument(skip(self, ctx, _validator), fields(url = %entry.raw, proxy = %proxy))]
    async fn fetch(
        &self,
        entry: &UrlEntry,
        ctx: &FetchContext,
        proxy: &ProxyEndpoint,
        _validator: Option<&str>,
    ) -> Result<FetchPayload, FetchError> {
        debug!("Fetching watch page");
        let response = ctx.http.get(&entry.raw, proxy).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(FetchError::Permanent(format!("Watch page returned {status}")));
        }
        if !status.is_success() {
            return Err(FetchError::Transient(format!("Watch page returned {status}")));
        }

        let html = response.text().await.map_err(FetchError::Http)?;
        let player_json = extract_player_response(&html)?;
        let record = record_from_player_response(&player_json)?;

        info!(video = %record.id, "Fast path resolved");
        Ok(FetchPayload::records(vec![record]))
    }
}

// ============================================================================
// Player Response Extraction
// ============================================================================

/// Extracts the player-response JSON object from watch page HTML.
///
/// The object is found by marker and delimited by brace counting, with
/// string and escape awareness so braces inside titles do not confuse it.
pub fn extract_player_response(html: &str) -> Result<String, FetchError> {
    let start_pos = html.find(PLAYER_RESPONSE_MARKER).ok_or_else(|| {
        FetchError::InvalidResponse("No player response in page HTML".to_string())
    })?;

    let remaining = &html[start_pos + PLAYER_RESPONSE_MARKER.len()..];

    let mut brace_count = 0i32;
    let mut in_string = false;
    let mut escape_next = false;
    let mut json_end = 0;

    for (i, ch) in remaining.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => brace_count += 1,
            '}' if !in_string => {
                brace_count -= 1;
                if brace_count == 0 {
                    json_end = i + 1;
                    break;
                }
            }
            _ => {}
        }
    }

    if json_end == 0 {
        return Err(FetchError::InvalidResponse(
            "Unterminated player response object".to_string(),
        ));
    }

    Ok(remaining[..json_end].to_string())
}

/// Builds a record from the `videoDetails` block of a player response.
pub fn record_from_player_response(json: &str) -> Result<VideoRecord, FetchError> {
    let player: serde_json::Value = serde_json::from_str(json)?;

    let details = player.get("videoDetails").ok_or_else(|| {
        FetchError::InvalidResponse("Player response has no videoDetails".to_string())
    })?;

    let id = details
        .get("videoId")
        .and_then(|v| v.as_str())
        .ok_or_else(|| FetchError::InvalidResponse("videoDetails has no videoId".to_string()))?;

    let mut record = VideoRecord::new(id, RecordSource::SingleVideoFast);
    record.title = str_field(details, "title");
    record.duration_seconds = str_field(details, "lengthSeconds").and_then(|s| s.parse().ok());
    record.view_count = str_field(details, "viewCount").and_then(|s| s.parse().ok());
    record.channel_id = str_field(details, "channelId");
    record.channel_title = str_field(details, "author");
    record.description = str_field(details, "shortDescription");
    record.published_at = publish_date(&player);
    record.raw = details.clone();

    Ok(record)
}

/// Pulls the publish date from the microformat block, when present.
fn publish_date(player: &serde_json::Value) -> Option<DateTime<Utc>> {
    let date = player
        .get("microformat")?
        .get("playerMicroformatRenderer")?
        .get("publishDate")?
        .as_str()?;

    // Newer pages carry a full timestamp, older ones a bare date.
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

fn str_field(value: &serde_json::Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_object() {
        let html = r#"<script>var ytInitialPlayerResponse = {"a":1};</script>"#;
        assert_eq!(extract_player_response(html).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn test_extract_nested_object() {
        let html = r#"var ytInitialPlayerResponse = {"outer":{"inner":"v"}};more"#;
        assert_eq!(
            extract_player_response(html).unwrap(),
            r#"{"outer":{"inner":"v"}}"#
        );
    }

    #[test]
    fn test_extract_braces_inside_strings() {
        let html = r#"var ytInitialPlayerResponse = {"title":"a } in \" here"};"#;
        assert_eq!(
            extract_player_response(html).unwrap(),
            r#"{"title":"a } in \" here"}"#
        );
    }

    #[test]
    fn test_extract_missing_marker() {
        let result = extract_player_response("<html>nothing here</html>");
        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
    }

    #[test]
    fn test_extract_unterminated() {
        let result = extract_player_response(r#"var ytInitialPlayerResponse = {"a":"#);
        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
    }

    #[test]
    fn test_record_from_video_details() {
        let json = r#"{
            "videoDetails": {
                "videoId": "abc12345678",
                "title": "Fast Title",
                "lengthSeconds": "213",
                "viewCount": "5000",
                "channelId": "UCfast",
                "author": "Fast Channel",
                "shortDescription": "short"
            },
            "microformat": {
                "playerMicroformatRenderer": { "publishDate": "2024-02-20" }
            }
        }"#;

        let record = record_from_player_response(json).unwrap();
        assert_eq!(record.id, "abc12345678");
        assert_eq!(record.title.as_deref(), Some("Fast Title"));
        assert_eq!(record.duration_seconds, Some(213));
        assert_eq!(record.view_count, Some(5000));
        assert_eq!(record.channel_title.as_deref(), Some("Fast Channel"));
        assert_eq!(
            record.published_at.map(|d| d.to_rfc3339()),
            Some("2024-02-20T00:00:00+00:00".to_string())
        );
        assert_eq!(record.source, RecordSource::SingleVideoFast);
    }

    #[test]
    fn test_record_without_details_is_invalid() {
        let result = record_from_player_response(r#"{"playabilityStatus":{}}"#);
        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
    }

    #[test]
    fn test_supports_single_video_only() {
        let adapter = FastVideoAdapter::new();
        assert!(adapter.supports(UrlKind::SingleVideo));
        assert!(!adapter.supports(UrlKind::Channel));
        assert!(!adapter.supports(UrlKind::Playlist));
        assert!(!adapter.is_authoritative());
    }
}
