//! RSS 2.0 parsing.
//!
//! Maps each `<item>` to a [`FeedItem`]:
//!
//! | RSS element | Field |
//! |-------------|-------|
//! | `title` | `title` |
//! | `link` (falls back to a URL-shaped `guid`) | `url` |
//! | `pubDate` (RFC 2822) | `published_at` |
//! | `description` (markup stripped) | `summary` |
//! | `category` | `categories` |
//! | `dc:creator` | `creator` |
//!
//! Channel-level `title`, `link`, `description` and `lastBuildDate` land in
//! [`FeedInfo`]. A malformed document fails as a whole; no partial list is
//! returned.

use crate::error::ParseError;
use crate::models::{Feed, FeedInfo, FeedItem};
use crate::utils::{collapse_whitespace, html_to_text, non_empty};
use chrono::DateTime;
use quick_xml::escape::{resolve_html5_entity, resolve_predefined_entity};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;

/// Parse an RSS document into channel info and items, in document order.
///
/// Text of a field (an element directly under `<item>` or `<channel>`) is
/// collected across any inline markup it contains, so
/// `<title>Memo <i>12</i></title>` yields `Memo 12`.
///
/// # Arguments
///
/// * `xml` - The raw body of the feed
///
/// # Returns
///
/// The channel's [`FeedInfo`] and one [`FeedItem`] per `<item>` that has a
/// title and a URL.
///
/// # Errors
///
/// A [`ParseError`] when the document is not well-formed XML or has no root
/// element. No partial list is returned.
pub fn parse_rss(xml: &str) -> Result<Feed, ParseError> {
    let mut reader = Reader::from_str(xml);

    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    // Index in `path` of the field whose text is being collected.
    let mut field: Option<usize> = None;
    let mut seen_root = false;

    let mut info = FeedInfo::default();
    let mut items = Vec::new();
    let mut current: Option<ItemBuilder> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ParseError::new(e.to_string(), reader.error_position() as u64))?;

        match event {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                seen_root = true;
                if field.is_none() {
                    if name == "item" {
                        current = Some(ItemBuilder::default());
                    } else if matches!(path.last().map(String::as_str), Some("item" | "channel")) {
                        field = Some(path.len());
                        text.clear();
                    }
                }
                path.push(name);
            }
            Event::Empty(_) => {
                seen_root = true;
            }
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|e| ParseError::new(e.to_string(), reader.buffer_position() as u64))?;
                if path.is_empty() && !decoded.trim().is_empty() {
                    return Err(ParseError::new(
                        "text outside of the root element",
                        reader.buffer_position() as u64,
                    ));
                }
                if field.is_some() {
                    text.push_str(&decoded);
                }
            }
            Event::CData(e) => {
                let decoded = e
                    .decode()
                    .map_err(|e| ParseError::new(e.to_string(), reader.buffer_position() as u64))?;
                if field.is_some() {
                    text.push_str(&decoded);
                }
            }
            Event::GeneralRef(e) => {
                if field.is_none() {
                    continue;
                }
                let resolved = e
                    .resolve_char_ref()
                    .map_err(|e| ParseError::new(e.to_string(), reader.buffer_position() as u64))?;
                match resolved {
                    Some(ch) => text.push(ch),
                    None => {
                        let name = e.decode().map_err(|e| {
                            ParseError::new(e.to_string(), reader.buffer_position() as u64)
                        })?;
                        let entity = resolve_predefined_entity(&name)
                            .or_else(|| resolve_html5_entity(&name));
                        match entity {
                            Some(s) => text.push_str(s),
                            None => {
                                text.push('&');
                                text.push_str(&name);
                                text.push(';');
                            }
                        }
                    }
                }
            }
            Event::End(_) => {
                let Some(name) = path.pop() else {
                    return Err(ParseError::new(
                        "closing tag without a matching opening tag",
                        reader.buffer_position() as u64,
                    ));
                };

                if field == Some(path.len()) {
                    field = None;
                    let value = std::mem::take(&mut text);
                    match path.last().map(String::as_str) {
                        Some("item") => {
                            if let Some(builder) = current.as_mut() {
                                builder.set(&name, value);
                            }
                        }
                        Some("channel") => set_info_field(&mut info, &name, value),
                        _ => {}
                    }
                } else if field.is_none() && name == "item" {
                    if let Some(builder) = current.take() {
                        match builder.build() {
                            Some(item) => items.push(item),
                            None => debug!("Skipping RSS item without title or link"),
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = path.last() {
        return Err(ParseError::new(
            format!("unexpected end of document: <{open}> is not closed"),
            xml.len() as u64,
        ));
    }
    if !seen_root {
        return Err(ParseError::new("document has no root element", 0));
    }

    debug!(items = items.len(), "Parsed RSS document");
    Ok(Feed { info, items })
}

fn set_info_field(info: &mut FeedInfo, name: &str, value: String) {
    let value = non_empty(collapse_whitespace(&value));
    match name {
        "title" => info.title = value,
        "link" => info.link = value,
        "description" => info.description = value,
        "lastBuildDate" => info.last_build_date = value,
        _ => {}
    }
}

#[derive(Default)]
struct ItemBuilder {
    title: Option<String>,
    link: Option<String>,
    guid: Option<String>,
    pub_date: Option<String>,
    description: Option<String>,
    categories: Vec<String>,
    creator: Option<String>,
}

impl ItemBuilder {
    fn set(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = non_empty(collapse_whitespace(&value)),
            "link" => self.link = non_empty(value.trim().to_string()),
            "guid" => self.guid = non_empty(value.trim().to_string()),
            "pubDate" => self.pub_date = non_empty(value.trim().to_string()),
            "description" => self.description = non_empty(html_to_text(&value)),
            "category" => {
                if let Some(c) = non_empty(collapse_whitespace(&value)) {
                    self.categories.push(c);
                }
            }
            "dc:creator" => self.creator = non_empty(collapse_whitespace(&value)),
            _ => {}
        }
    }

    fn build(self) -> Option<FeedItem> {
        let url = self.link.or_else(|| {
            self.guid
                .filter(|g| g.starts_with("http://") || g.starts_with("https://"))
        })?;

        let mut published_at = None;
        let mut unparsed_date = None;
        if let Some(raw) = self.pub_date {
            match DateTime::parse_from_rfc2822(&raw) {
                Ok(dt) => published_at = Some(dt),
                Err(e) => {
                    debug!(pub_date = %raw, error = %e, "Unparseable pubDate; keeping raw text");
                    unparsed_date = Some(raw);
                }
            }
        }

        Some(FeedItem {
            title: self.title?,
            url,
            published_at,
            unparsed_date,
            summary: self.description,
            categories: self.categories,
            creator: self.creator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPED_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Department of Education</title>
    <atom:link href="https://www.deped.gov.ph/feed/" rel="self" type="application/rss+xml" />
    <link>https://www.deped.gov.ph</link>
    <description>Official website</description>
    <lastBuildDate>Tue, 06 May 2025 08:00:00 +0000</lastBuildDate>
    <item>
      <title>DepEd Memorandum No. 12, s. 2025</title>
      <link>https://www.deped.gov.ph/2025/05/06/memo-12/</link>
      <dc:creator><![CDATA[DepEd Communications]]></dc:creator>
      <pubDate>Tue, 06 May 2025 06:15:00 +0000</pubDate>
      <category><![CDATA[Memoranda]]></category>
      <category><![CDATA[Issuances]]></category>
      <description><![CDATA[<p>Guidelines on the opening of classes.</p> <p>The post <a href="https://www.deped.gov.ph/">Memo</a> appeared first.</p>]]></description>
    </item>
    <item>
      <title>Brigada Eskwela &amp; School Readiness</title>
      <link>https://www.deped.gov.ph/2025/05/05/brigada/</link>
      <pubDate>Mon, 05 May 2025 10:00:00 +0000</pubDate>
    </item>
    <item>
      <title>Teachers&#8217; Day</title>
      <link>https://www.deped.gov.ph/2025/05/04/teachers-day/</link>
      <pubDate>not a date</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_items_in_document_order() {
        let feed = parse_rss(DEPED_FEED).unwrap();
        let titles: Vec<&str> = feed.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "DepEd Memorandum No. 12, s. 2025",
                "Brigada Eskwela & School Readiness",
                "Teachers\u{2019} Day",
            ]
        );
        assert!(feed.items.iter().all(|i| !i.url.is_empty()));
    }

    #[test]
    fn test_field_mapping() {
        let feed = parse_rss(DEPED_FEED).unwrap();
        let first = &feed.items[0];
        assert_eq!(first.url, "https://www.deped.gov.ph/2025/05/06/memo-12/");
        assert_eq!(
            first.published_at,
            Some(DateTime::parse_from_rfc2822("Tue, 06 May 2025 06:15:00 +0000").unwrap())
        );
        assert_eq!(
            first.summary.as_deref(),
            Some("Guidelines on the opening of classes. The post Memo appeared first.")
        );
        assert_eq!(first.categories, vec!["Memoranda", "Issuances"]);
        assert_eq!(first.creator.as_deref(), Some("DepEd Communications"));
    }

    #[test]
    fn test_unparseable_date_keeps_source_text() {
        let feed = parse_rss(DEPED_FEED).unwrap();
        let item = &feed.items[2];
        assert_eq!(item.published_at, None);
        assert_eq!(item.unparsed_date.as_deref(), Some("not a date"));
        assert_eq!(item.formatted_date().as_deref(), Some("not a date"));
        assert_eq!(feed.items[0].unparsed_date, None);
        assert_eq!(feed.items[1].summary, None);
    }

    #[test]
    fn test_inline_markup_inside_fields() {
        let xml = r#"<rss><channel>
            <title>DepEd <b>News</b></title>
            <item>
              <title>Memo <i>12</i> released</title>
              <link>http://a/1</link>
              <description><p>Guidelines for <b>classes</b>.</p></description>
            </item>
            <item><title><b>Bold only</b></title><link>http://a/2</link></item>
            <item><title>Plain</title><link>http://a/3</link></item>
        </channel></rss>"#;
        let feed = parse_rss(xml).unwrap();
        assert_eq!(feed.info.title.as_deref(), Some("DepEd News"));
        let got: Vec<(&str, Option<&str>)> = feed
            .items
            .iter()
            .map(|i| (i.title.as_str(), i.summary.as_deref()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Memo 12 released", Some("Guidelines for classes.")),
                ("Bold only", None),
                ("Plain", None),
            ]
        );
    }

    #[test]
    fn test_html_entities_are_decoded() {
        let xml = r#"<rss><channel><item>
            <title>A&nbsp;B &hellip; &amp; C</title>
            <link>http://a/1</link>
            <description>Caf&eacute; &unknownentity;</description>
        </item></channel></rss>"#;
        let feed = parse_rss(xml).unwrap();
        assert_eq!(feed.items[0].title, "A B \u{2026} & C");
        assert_eq!(feed.items[0].summary.as_deref(), Some("Caf\u{e9} &unknownentity;"));
    }

    #[test]
    fn test_channel_info() {
        let feed = parse_rss(DEPED_FEED).unwrap();
        assert_eq!(feed.info.title.as_deref(), Some("Department of Education"));
        assert_eq!(feed.info.link.as_deref(), Some("https://www.deped.gov.ph"));
        assert_eq!(feed.info.description.as_deref(), Some("Official website"));
        assert_eq!(
            feed.info.last_build_date.as_deref(),
            Some("Tue, 06 May 2025 08:00:00 +0000")
        );
    }

    #[test]
    fn test_single_item_example() {
        let xml = "<item><title>Memo 001</title><link>http://example.org/1</link></item>";
        let feed = parse_rss(xml).unwrap();
        assert_eq!(
            feed.items,
            vec![FeedItem {
                title: "Memo 001".to_string(),
                url: "http://example.org/1".to_string(),
                published_at: None,
                unparsed_date: None,
                summary: None,
                categories: vec![],
                creator: None,
            }]
        );
    }

    #[test]
    fn test_malformed_mismatched_tags() {
        let xml = "<rss><channel><item><title>Memo</link></item></channel></rss>";
        assert!(parse_rss(xml).is_err());
    }

    #[test]
    fn test_malformed_truncated_document() {
        let xml = "<rss><channel><item><title>Memo 001</title><link>http://example.org/1</link></item>";
        assert!(parse_rss(xml).is_err());
    }

    #[test]
    fn test_empty_and_non_xml_bodies() {
        assert!(parse_rss("").is_err());
        assert!(parse_rss("   ").is_err());
        assert!(parse_rss("Service Unavailable").is_err());
    }

    #[test]
    fn test_items_without_title_or_link_are_skipped() {
        let xml = r#"<rss><channel>
            <item><title>No link</title></item>
            <item><link>https://example.org/no-title</link></item>
            <item><title>Guid only</title><guid isPermaLink="true">https://example.org/g</guid></item>
        </channel></rss>"#;
        let feed = parse_rss(xml).unwrap();
        assert_eq!(feed.items.len(), 1);
        assert_eq!(feed.items[0].url, "https://example.org/g");
    }

    #[test]
    fn test_feed_without_items() {
        let feed = parse_rss("<rss><channel><title>Empty</title></channel></rss>").unwrap();
        assert!(feed.items.is_empty());
        assert_eq!(feed.info.title.as_deref(), Some("Empty"));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(parse_rss(DEPED_FEED).unwrap(), parse_rss(DEPED_FEED).unwrap());
    }
}
