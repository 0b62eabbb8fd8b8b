//! Hacker News front page scraper.
//!
//! Each story is a `tr.athing` row whose `span.titleline > a` holds the title
//! and link. The row after it carries `td.subtext` (points, author, age,
//! comment count), which becomes the item summary. Self posts link to
//! `item?id=…` and are resolved against the site root.

use crate::models::FeedItem;
use crate::utils::{collapse_whitespace, non_empty};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const HACKERNEWS_BASE_URL: &str = "https://news.ycombinator.com/";

static STORY_ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr.athing").expect("static selector"));
static TITLE_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.titleline > a[href]").expect("static selector"));
static SUBTEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td.subtext").expect("static selector"));

/// Extract stories from a Hacker News listing page, in page order.
///
/// Returns an empty list if the page does not contain the expected rows.
pub fn parse_hackernews(html: &str) -> Vec<FeedItem> {
    let document = Html::parse_document(html);
    let base = Url::parse(HACKERNEWS_BASE_URL).ok();

    let mut posts = Vec::new();
    for row in document.select(&STORY_ROW) {
        let Some(link) = row.select(&TITLE_LINK).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let title = collapse_whitespace(&link.text().collect::<String>());
        if title.is_empty() {
            continue;
        }

        let url = base
            .as_ref()
            .and_then(|b| b.join(href).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| href.to_string());

        let summary = row
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .next()
            .and_then(|next| next.select(&SUBTEXT).next())
            .map(|td| collapse_whitespace(&td.text().collect::<Vec<_>>().join(" ")))
            .and_then(non_empty);

        posts.push(FeedItem {
            summary,
            ..FeedItem::new(title, url)
        });
    }
    posts
}
