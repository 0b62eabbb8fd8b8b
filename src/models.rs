//! Data models for records extracted from feeds and listing pages.
//!
//! - [`FeedItem`]: one article, post or repository pulled from a source
//! - [`FeedInfo`]: channel-level metadata of an RSS document
//! - [`Feed`]: the full result of parsing an RSS document
//!
//! Records are built fresh on every fetch, handed to the calling tool once,
//! and dropped when the turn completes. Nothing here is cached or
//! deduplicated, and item order always follows the source document.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A normalized record for one entry of a feed or listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Headline, post title, or `owner/repo` for GitHub.
    pub title: String,
    /// Absolute link to the entry.
    pub url: String,
    /// Publication time, when the source provides a parseable one.
    pub published_at: Option<DateTime<FixedOffset>>,
    /// The source's date text when it could not be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unparsed_date: Option<String>,
    /// Plain-text excerpt, description, or listing metadata.
    pub summary: Option<String>,
    /// RSS `<category>` values, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    /// RSS `<dc:creator>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl FeedItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Publication date in the long form used for display, e.g.
    /// `May 06, 2025 at 02:30 PM`. Falls back to the source's own text when
    /// it could not be parsed.
    pub fn formatted_date(&self) -> Option<String> {
        self.published_at
            .map(|dt| dt.format("%B %d, %Y at %I:%M %p").to_string())
            .or_else(|| self.unparsed_date.clone())
    }
}

/// Channel metadata from an RSS document. Every field is optional because
/// feeds in the wild omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedInfo {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub last_build_date: Option<String>,
}

/// A parsed RSS document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub info: FeedInfo,
    pub items: Vec<FeedItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_item_new_leaves_optional_fields_empty() {
        let item = FeedItem::new("Memo 001", "http://example.org/1");
        assert_eq!(item.title, "Memo 001");
        assert_eq!(item.url, "http://example.org/1");
        assert_eq!(item.published_at, None);
        assert_eq!(item.unparsed_date, None);
        assert_eq!(item.summary, None);
        assert!(item.categories.is_empty());
        assert_eq!(item.creator, None);
    }

    #[test]
    fn test_feed_item_serialization_skips_empty_extras() {
        let item = FeedItem::new("Memo 001", "http://example.org/1");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Memo 001","url":"http://example.org/1","published_at":null,"summary":null}"#
        );
    }

    #[test]
    fn test_feed_item_deserialization_defaults_extras() {
        let json = r#"{"title":"t","url":"https://example.com","published_at":null,"summary":"s"}"#;
        let item: FeedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.summary.as_deref(), Some("s"));
        assert!(item.categories.is_empty());
    }

    #[test]
    fn test_formatted_date() {
        let mut item = FeedItem::new("t", "https://example.com");
        assert_eq!(item.formatted_date(), None);
        item.published_at =
            Some(DateTime::parse_from_rfc2822("Tue, 06 May 2025 14:30:00 +0800").unwrap());
        assert_eq!(
            item.formatted_date().as_deref(),
            Some("May 06, 2025 at 02:30 PM")
        );
    }

    #[test]
    fn test_formatted_date_falls_back_to_source_text() {
        let mut item = FeedItem::new("t", "https://example.com");
        item.unparsed_date = Some("Martes, 6 Mayo 2025".to_string());
        assert_eq!(item.formatted_date().as_deref(), Some("Martes, 6 Mayo 2025"));
    }
}
