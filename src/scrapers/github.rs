//! GitHub trending page scraper.
//!
//! Each repository is an `article.Box-row`. The `h2 a` link text is split
//! across whitespace and a slash (`owner /\n repo`) and is compacted to
//! `owner/repo`; its relative `href` is made absolute on `github.com`.

use crate::models::FeedItem;
use crate::utils::{collapse_whitespace, non_empty};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use url::Url;

pub const GITHUB_BASE_URL: &str = "https://github.com";

static REPO_ARTICLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.Box-row").expect("static selector"));
static REPO_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2 a[href]").expect("static selector"));
static REPO_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("static selector"));

/// Extract trending repositories, in page order. An empty list means the
/// page had no `article.Box-row` entries.
pub fn parse_github_trending(html: &str) -> Vec<FeedItem> {
    let document = Html::parse_document(html);
    let base = Url::parse(GITHUB_BASE_URL).ok();

    let mut repos = Vec::new();
    for article in document.select(&REPO_ARTICLE) {
        let Some(link) = article.select(&REPO_LINK).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        let title: String = link.text().flat_map(str::split_whitespace).collect();
        if title.is_empty() {
            continue;
        }

        let url = base
            .as_ref()
            .and_then(|b| b.join(href).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| format!("{GITHUB_BASE_URL}{href}"));

        let summary = article
            .select(&REPO_DESCRIPTION)
            .next()
            .and_then(|p| non_empty(collapse_whitespace(&p.text().collect::<String>())));

        repos.push(FeedItem {
            summary,
            ..FeedItem::new(title, url)
        });
    }
    repos
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRENDING: &str = r#"<html><body><main>
<article class="Box-row">
  <h2 class="h3 lh-condensed">
    <a href="/rust-lang/rust" data-view-component="true" class="Link">
      <svg class="octicon octicon-repo"></svg>
      <span data-view-component="true" class="text-normal">rust-lang /</span>
      rust
    </a>
  </h2>
  <p class="col-9 color-fg-muted my-1 pr-4">
    Empowering everyone to build reliable and efficient software.
  </p>
</article>
<article class="Box-row">
  <h2 class="h3 lh-condensed">
    <a href="/tokio-rs/tokio"><span class="text-normal">tokio-rs / </span>tokio</a>
  </h2>
</article>
<article class="Box-row"><h2 class="h3">no link</h2></article>
</main></body></html>"#;

    #[test]
    fn test_parse_repos() {
        let repos = parse_github_trending(TRENDING);
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].title, "rust-lang/rust");
        assert_eq!(repos[0].url, "https://github.com/rust-lang/rust");
        assert_eq!(
            repos[0].summary.as_deref(),
            Some("Empowering everyone to build reliable and efficient software.")
        );
        assert_eq!(repos[1].title, "tokio-rs/tokio");
        assert_eq!(repos[1].url, "https://github.com/tokio-rs/tokio");
        assert_eq!(repos[1].summary, None);
    }

    #[test]
    fn test_missing_markup_yields_empty() {
        assert!(parse_github_trending("").is_empty());
        assert!(parse_github_trending("<div class=\"repo-list\"><li>x</li></div>").is_empty());
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(parse_github_trending(TRENDING), parse_github_trending(TRENDING));
    }
}
