//! Input file loading.
//!
//! The input file carries one URL per line. A line may optionally attach a
//! human label after a tab character (`<url>\t<label>`). Blank lines and
//! lines starting with `#` are skipped.

use std::path::Path;

use anyhow::{Context, Result};
use tubesift_core::UrlEntry;

/// Load and classify URL entries from an input file.
pub fn load_entries(path: &Path) -> Result<Vec<UrlEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    Ok(parse_entries(&content))
}

/// Parse URL entries from raw input text.
pub fn parse_entries(content: &str) -> Vec<UrlEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.split_once('\t') {
            Some((url, label)) => UrlEntry::new(url.trim()).with_label(label.trim()),
            None => UrlEntry::new(line),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubesift_core::UrlKind;

    #[test]
    fn test_parse_entries_skips_blanks_and_comments() {
        let content = "\
# watchlist
https://www.youtube.com/watch?v=abc123def45

# channels
https://www.youtube.com/channel/UC1234567890123456789012
";
        let entries = parse_entries(content);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, UrlKind::SingleVideo);
        assert_eq!(entries[1].kind, UrlKind::Channel);
    }

    #[test]
    fn test_parse_entries_with_labels() {
        let content = "https://www.youtube.com/watch?v=abc123def45\tmy favourite\n";
        let entries = parse_entries(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].label.as_deref(), Some("my favourite"));
    }

    #[test]
    fn test_parse_entries_keeps_unknown_lines() {
        let entries = parse_entries("not a url at all\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, UrlKind::Unknown);
    }
}
