//! URL classification.
//!
//! The classifier decides which provider chain a link should take. It is a
//! pure function over the URL string: no network access, no failure mode,
//! every input maps to some [`UrlKind`].

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Url Kind
// ============================================================================

/// What a video-platform URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlKind {
    /// A single watch page (`watch?v=` or a short link).
    SingleVideo,
    /// A channel page (`/channel/`, `/@handle`, `/c/`, `/user/`).
    Channel,
    /// A playlist (`list=` or `/playlist`).
    Playlist,
    /// Anything the classifier does not recognize.
    Unknown,
}

impl UrlKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SingleVideo => "single video",
            Self::Channel => "channel",
            Self::Playlist => "playlist",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true if this kind lists multiple videos.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Channel | Self::Playlist)
    }
}

impl fmt::Display for UrlKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Classifies a URL string into a [`UrlKind`].
///
/// Deterministic and total: every string gets a kind, unrecognized ones map
/// to [`UrlKind::Unknown`]. Playlist markers are checked before channel
/// markers so `/channel/…?list=…` resolves as a playlist.
pub fn classify(url: &str) -> UrlKind {
    if url.contains("watch?v=") || url.contains("youtu.be/") {
        return UrlKind::SingleVideo;
    }
    if url.contains("list=") || url.contains("/playlist") {
        return UrlKind::Playlist;
    }
    if url.contains("/channel/")
        || url.contains("/@")
        || url.contains("/c/")
        || url.contains("/user/")
    {
        return UrlKind::Channel;
    }
    UrlKind::Unknown
}

// ============================================================================
// Url Entry
// ============================================================================

/// One input URL, classified. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    /// The raw input string.
    pub raw: String,
    /// The derived kind.
    pub kind: UrlKind,
    /// Optional per-URL annotation carried through to the report
    /// (e.g. a country or campaign tag from the input file).
    pub label: Option<String>,
}

impl UrlEntry {
    /// Classifies a raw URL into an entry.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let kind = classify(&raw);
        Self {
            raw,
            kind,
            label: None,
        }
    }

    /// Attaches a label to this entry.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Returns the cache key for this entry, if it has one.
    ///
    /// Channels key by channel id (falling back to handle), playlists by
    /// playlist id. Single videos and unknown URLs are never cached.
    pub fn cache_key(&self) -> Option<String> {
        match self.kind {
            UrlKind::Channel => channel_id(&self.raw).or_else(|| handle(&self.raw)),
            UrlKind::Playlist => playlist_id(&self.raw),
            _ => None,
        }
    }
}

// ============================================================================
// Identifier extraction
// ============================================================================

/// Extracts the video id from a watch or short-link URL.
pub fn video_id(url: &str) -> Option<String> {
    if let Some(pos) = url.find("watch?v=") {
        return Some(take_id(&url[pos + "watch?v=".len()..]));
    }
    if let Some(pos) = url.find("youtu.be/") {
        return Some(take_id(&url[pos + "youtu.be/".len()..]));
    }
    None
}

/// Extracts the channel id from a `/channel/<id>` URL.
pub fn channel_id(url: &str) -> Option<String> {
    let pos = url.find("/channel/")?;
    Some(take_id(&url[pos + "/channel/".len()..]))
}

/// Extracts the `@handle` from a handle URL, including the `@`.
pub fn handle(url: &str) -> Option<String> {
    let pos = url.find("/@")?;
    Some(format!("@{}", take_id(&url[pos + "/@".len()..])))
}

/// Extracts the playlist id from a `list=` parameter.
pub fn playlist_id(url: &str) -> Option<String> {
    let pos = url.find("list=")?;
    Some(take_id(&url[pos + "list=".len()..]))
}

/// Takes characters up to the next URL delimiter.
fn take_id(s: &str) -> String {
    s.chars()
        .take_while(|c| !matches!(c, '&' | '?' | '/' | '#'))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_single_video() {
        assert_eq!(
            classify("https://www.youtube.com/watch?v=XYZ123abc-_"),
            UrlKind::SingleVideo
        );
        assert_eq!(classify("https://youtu.be/XYZ123abc-_"), UrlKind::SingleVideo);
    }

    #[test]
    fn test_classify_channel() {
        assert_eq!(
            classify("https://www.youtube.com/channel/UCVjlpEjEY9GpksqbEesJnNA"),
            UrlKind::Channel
        );
        assert_eq!(classify("https://www.youtube.com/@muni_gurume"), UrlKind::Channel);
        assert_eq!(classify("https://www.youtube.com/c/SomeName"), UrlKind::Channel);
        assert_eq!(classify("https://www.youtube.com/user/old_style"), UrlKind::Channel);
    }

    #[test]
    fn test_classify_playlist() {
        assert_eq!(
            classify("https://www.youtube.com/playlist?list=PLabcdef"),
            UrlKind::Playlist
        );
        // playlist marker wins over channel marker
        assert_eq!(
            classify("https://www.youtube.com/channel/UCx?list=PLabcdef"),
            UrlKind::Playlist
        );
    }

    #[test]
    fn test_classify_unknown_is_total() {
        assert_eq!(classify(""), UrlKind::Unknown);
        assert_eq!(classify("not a url at all"), UrlKind::Unknown);
        assert_eq!(classify("https://example.com/"), UrlKind::Unknown);
    }

    #[test]
    fn test_video_id_extraction() {
        assert_eq!(
            video_id("https://www.youtube.com/watch?v=abc123&t=10"),
            Some("abc123".to_string())
        );
        assert_eq!(
            video_id("https://youtu.be/abc123?si=xyz"),
            Some("abc123".to_string())
        );
        assert_eq!(video_id("https://www.youtube.com/@handle"), None);
    }

    #[test]
    fn test_channel_and_playlist_ids() {
        assert_eq!(
            channel_id("https://www.youtube.com/channel/UCabc/videos"),
            Some("UCabc".to_string())
        );
        assert_eq!(
            handle("https://www.youtube.com/@muni_gurume"),
            Some("@muni_gurume".to_string())
        );
        assert_eq!(
            playlist_id("https://www.youtube.com/playlist?list=PLxyz&index=2"),
            Some("PLxyz".to_string())
        );
    }

    #[test]
    fn test_cache_key() {
        let channel = UrlEntry::new("https://www.youtube.com/channel/UCabc");
        assert_eq!(channel.cache_key(), Some("UCabc".to_string()));

        let handle = UrlEntry::new("https://www.youtube.com/@muni_gurume");
        assert_eq!(handle.cache_key(), Some("@muni_gurume".to_string()));

        let video = UrlEntry::new("https://www.youtube.com/watch?v=abc");
        assert_eq!(video.cache_key(), None);
    }

    #[test]
    fn test_entry_label() {
        let entry = UrlEntry::new("https://www.youtube.com/@x").with_label("日本");
        assert_eq!(entry.label.as_deref(), Some("日本"));
        assert_eq!(entry.kind, UrlKind::Channel);
    }
}
