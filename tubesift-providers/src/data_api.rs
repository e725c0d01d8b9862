//! Authoritative Data API adapter.
//!
//! Talks to the quota-metered YouTube Data API v3 with conditional
//! requests: the validator token cached from the previous run is sent as
//! `If-None-Match`, and a 304 means the cached records are still current
//! at zero list cost. Quota exhaustion (403/429) is reported as
//! `RateLimited` and is never retried here; the chain falls straight
//! through to the scraper.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, IF_NONE_MATCH};
use reqwest::StatusCode;
use tracing::{debug, info, instrument, warn};
use tubesift_core::{channel_id, playlist_id, RecordSource, UrlEntry, UrlKind, VideoRecord};
use tubesift_fetch::{
    FetchContext, FetchError, FetchPayload, ProviderAdapter, ProxyEndpoint, ResponseExt,
};

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Page size requested from list endpoints.
const MAX_RESULTS: u32 = 50;

// ============================================================================
// Data API Adapter
// ============================================================================

/// Authoritative adapter for channels and playlists.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataApiAdapter;

impl DataApiAdapter {
    /// Creates a new Data API adapter.
    pub fn new() -> Self {
        Self
    }

    /// Builds the list URL for an entry, or None when no usable
    /// identifier can be extracted.
    ///
    /// Handle and legacy `/c/` channel URLs carry no channel id the API
    /// can consume, so they fall through to the scraper.
    fn request_url(entry: &UrlEntry, key: &str) -> Option<String> {
        match entry.kind {
            UrlKind::Channel => {
                let channel_id = channel_id(&entry.raw)?;
                Some(format!(
                    "{API_BASE}/search?part=snippet&channelId={channel_id}\
                    &maxResults={MAX_RESULTS}&order=date&type=video&key={key}"
                ))
            }
            UrlKind::Playlist => {
                let playlist_id = playlist_id(&entry.raw)?;
                Some(format!(
                    "{API_BASE}/playlistItems?part=snippet&playlistId={playlist_id}\
                    &maxResults={MAX_RESULTS}&key={key}"
                ))
            }
            _ => None,
        }
    }
}

#[async_trait]
impl ProviderAdapter for DataApiAdapter {
    fn id(&self) -> &str {
        "data_api"
    }

    fn source(&self) -> RecordSource {
        RecordSource::Api
    }

    fn supports(&self, kind: UrlKind) -> bool {
        matches!(kind, UrlKind::Channel | UrlKind::Playlist)
    }

    fn is_authoritative(&self) -> bool {
        true
    }

    async fn is_available(&self, ctx: &FetchContext) -> bool {
        ctx.api_key.is_some()
    }

    #[instrument(skip(self, ctx, validator), fields(url = %entry.raw))]
    async fn fetch(
        &self,
        entry: &UrlEntry,
        ctx: &FetchContext,
        proxy: &ProxyEndpoint,
        validator: Option<&str>,
    ) -> Result<FetchPayload, FetchError> {
        let key = ctx
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::NotConfigured("No API credential".to_string()))?;

        let request_url = Self::request_url(entry, key).ok_or_else(|| {
            FetchError::Permanent(format!("No API-usable identifier in {}", entry.raw))
        })?;

        let mut headers = HeaderMap::new();
        if let Some(token) = validator {
            if let Ok(value) = HeaderValue::from_str(token) {
                headers.insert(IF_NONE_MATCH, value);
            }
        }

        debug!(conditional = validator.is_some(), "Data API request");
        let response = ctx.http.get_with_headers(&request_url, proxy, headers).await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            info!("Validator unchanged, content current");
            return Ok(FetchPayload::NotModified);
        }

        if response.status() == StatusCode::FORBIDDEN || response.is_rate_limited() {
            let retry_after = response.retry_after_secs();
            warn!(status = %response.status(), "Data API quota exhausted");
            return Err(FetchError::RateLimited { retry_after });
        }

        if !response.status().is_success() {
            return Err(FetchError::Permanent(format!(
                "Data API returned {}",
                response.status()
            )));
        }

        let new_token = response.etag();
        let body = response.text().await.map_err(FetchError::Http)?;
        let records = parse_list_response(&body)?;

        info!(records = records.len(), "Data API fetch complete");
        Ok(FetchPayload::Modified {
            records,
            validator_token: new_token,
        })
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Parses a `search` or `playlistItems` list response into records.
///
/// Both endpoints share the snippet shape; they differ only in where the
/// video id lives (`id.videoId` vs `snippet.resourceId.videoId`).
pub fn parse_list_response(body: &str) -> Result<Vec<VideoRecord>, FetchError> {
    let data: serde_json::Value = serde_json::from_str(body)?;

    let items = data
        .get("items")
        .and_then(|v| v.as_array())
        .ok_or_else(|| FetchError::InvalidResponse("Missing items array".to_string()))?;

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let Some(video_id) = item_video_id(item) else {
            // Channel and playlist stubs appear alongside videos; skip them.
            continue;
        };

        let snippet = item.get("snippet").cloned().unwrap_or_default();
        let mut record = VideoRecord::new(video_id, RecordSource::Api);
        record.title = str_field(&snippet, "title");
        record.description = str_field(&snippet, "description");
        record.channel_id = str_field(&snippet, "channelId");
        record.channel_title = str_field(&snippet, "channelTitle");
        record.published_at = str_field(&snippet, "publishedAt")
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|d| d.with_timezone(&Utc));
        record.raw = item.clone();
        records.push(record);
    }

    Ok(records)
}

fn item_video_id(item: &serde_json::Value) -> Option<String> {
    // search: { "id": { "kind": "youtube#video", "videoId": "..." } }
    if let Some(id) = item.get("id") {
        if id.get("kind").and_then(|k| k.as_str()) == Some("youtube#video") {
            if let Some(vid) = id.get("videoId").and_then(|v| v.as_str()) {
                return Some(vid.to_string());
            }
        }
    }
    // playlistItems: { "snippet": { "resourceId": { "videoId": "..." } } }
    item.get("snippet")
        .and_then(|s| s.get("resourceId"))
        .and_then(|r| r.get("videoId"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
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

    const SEARCH_BODY: &str = r#"{
        "etag": "outer-etag",
        "items": [
            {
                "id": { "kind": "youtube#video", "videoId": "vid_one" },
                "snippet": {
                    "title": "First",
                    "description": "desc one",
                    "publishedAt": "2024-05-01T12:00:00Z",
                    "channelId": "UCabc",
                    "channelTitle": "Some Channel"
                }
            },
            {
                "id": { "kind": "youtube#channel", "channelId": "UCabc" },
                "snippet": { "title": "channel stub" }
            }
        ]
    }"#;

    const PLAYLIST_BODY: &str = r#"{
        "items": [
            {
                "id": "item1",
                "snippet": {
                    "title": "Playlist Video",
                    "resourceId": { "kind": "youtube#video", "videoId": "pl_vid" },
                    "channelId": "UCz",
                    "channelTitle": "Owner"
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_search_response() {
        let records = parse_list_response(SEARCH_BODY).unwrap();
        // channel stubs are skipped
        assert_eq!(records.len(), 1);

        let rec = &records[0];
        assert_eq!(rec.id, "vid_one");
        assert_eq!(rec.title.as_deref(), Some("First"));
        assert_eq!(rec.channel_id.as_deref(), Some("UCabc"));
        assert_eq!(rec.channel_title.as_deref(), Some("Some Channel"));
        assert!(rec.published_at.is_some());
        assert_eq!(rec.source, RecordSource::Api);
    }

    #[test]
    fn test_parse_playlist_items_response() {
        let records = parse_list_response(PLAYLIST_BODY).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "pl_vid");
        assert_eq!(records[0].title.as_deref(), Some("Playlist Video"));
    }

    #[test]
    fn test_parse_missing_items_is_invalid() {
        let result = parse_list_response(r#"{"etag": "x"}"#);
        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
    }

    #[test]
    fn test_request_url_channel_by_id() {
        let entry = UrlEntry::new("https://www.youtube.com/channel/UCabc123");
        let url = DataApiAdapter::request_url(&entry, "KEY").unwrap();
        assert!(url.contains("/search?"));
        assert!(url.contains("channelId=UCabc123"));
        assert!(url.contains("key=KEY"));
    }

    #[test]
    fn test_request_url_playlist() {
        let entry = UrlEntry::new("https://www.youtube.com/playlist?list=PLxyz");
        let url = DataApiAdapter::request_url(&entry, "KEY").unwrap();
        assert!(url.contains("/playlistItems?"));
        assert!(url.contains("playlistId=PLxyz"));
    }

    #[test]
    fn test_request_url_handle_has_no_id() {
        // Handle URLs carry no channel id usable by the API.
        let entry = UrlEntry::new("https://www.youtube.com/@somehandle");
        assert!(DataApiAdapter::request_url(&entry, "KEY").is_none());
    }

    #[test]
    fn test_supports_collections_only() {
        let adapter = DataApiAdapter::new();
        assert!(adapter.supports(UrlKind::Channel));
        assert!(adapter.supports(UrlKind::Playlist));
        assert!(!adapter.supports(UrlKind::SingleVideo));
        assert!(!adapter.supports(UrlKind::Unknown));
        assert!(adapter.is_authoritative());
    }
}
