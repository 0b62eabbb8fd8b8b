//! Web search results scraper for the DuckDuckGo HTML endpoint.
//!
//! Results are `div.result` blocks with an `a.result__a` title link and an
//! optional `.result__snippet`. Sponsored blocks (`result--ad`) are skipped.
//! Result links point at a redirect (`//duckduckgo.com/l/?uddg=<target>`)
//! which is unwrapped to the target URL.

use crate::models::FeedItem;
use crate::utils::{collapse_whitespace, non_empty};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

const SEARCH_BASE_URL: &str = "https://duckduckgo.com/";

static RESULT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.result").expect("static selector"));
static RESULT_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__a[href]").expect("static selector"));
static RESULT_SNIPPET: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result__snippet").expect("static selector"));

/// Build the search URL for `query` by appending it, URL-encoded, to
/// `search_url` (e.g. `https://html.duckduckgo.com/html/?q=`).
pub fn search_url(search_url: &str, query: &str) -> String {
    format!("{search_url}{}", urlencoding::encode(query.trim()))
}

/// Extract organic search results in ranking order.
pub fn parse_search_results(html: &str) -> Vec<FeedItem> {
    let document = Html::parse_document(html);
    let base = Url::parse(SEARCH_BASE_URL).ok();

    let mut results = Vec::new();
    for block in document.select(&RESULT) {
        if block.value().classes().any(|c| c == "result--ad") {
            continue;
        }
        let Some(link) = block.select(&RESULT_LINK).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let title = collapse_whitespace(&link.text().collect::<String>());
        if title.is_empty() {
            continue;
        }

        let url = match base.as_ref().and_then(|b| b.join(href).ok()) {
            Some(resolved) => unwrap_redirect(&resolved),
            None => href.to_string(),
        };

        let summary = block
            .select(&RESULT_SNIPPET)
            .next()
            .and_then(|s| non_empty(collapse_whitespace(&s.text().collect::<String>())));

        results.push(FeedItem {
            summary,
            ..FeedItem::new(title, url)
        });
    }
    results
}

/// `https://duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2F` -> `https://example.com/`
fn unwrap_redirect(url: &Url) -> String {
    if url.path() == "/l/" {
        if let Some((_, target)) = url.query_pairs().find(|(k, _)| k == "uddg") {
            return target.into_owned();
        }
    }
    url.to_string()
}
