//! Specialist tools: one fixed source each, fetch then extract then format.
//!
//! | Tool | Agent | Source |
//! |------|-------|--------|
//! | `get_hackernews_posts` | `hackernews_agent` | Hacker News front page |
//! | `get_github_trending_repos` | `hackernews_agent` | GitHub trending |
//! | `get_deped_rss_feed` | `deped_agent` | DepEd RSS feed |
//! | `web_search` | `search_assistant` | DuckDuckGo HTML results |
//!
//! Tools never return `Err`: failures become [`ToolResponse::Error`] with a
//! human-readable message, which is what the agent relays to the user.

use crate::agents::Specialist;
use crate::config::SourcesConfig;
use crate::error::{FetchError, IngestError};
use crate::fetcher::Fetcher;
use crate::models::{Feed, FeedInfo, FeedItem};
use crate::scrapers;
use serde::Serialize;
use std::fmt::{self, Write};
use tracing::{info, instrument, warn};

/// A resolved tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    /// `None` returns every post on the page.
    HackerNewsPosts { number_of_posts: Option<usize> },
    /// `None` returns every repository on the page.
    GithubTrendingRepos { number_of_repos: Option<usize> },
    DepedRssFeed { max_items: usize },
    WebSearch { query: String },
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::HackerNewsPosts { .. } => "get_hackernews_posts",
            ToolCall::GithubTrendingRepos { .. } => "get_github_trending_repos",
            ToolCall::DepedRssFeed { .. } => "get_deped_rss_feed",
            ToolCall::WebSearch { .. } => "web_search",
        }
    }

    /// The specialist that owns this tool.
    pub fn specialist(&self) -> Specialist {
        match self {
            ToolCall::HackerNewsPosts { .. } | ToolCall::GithubTrendingRepos { .. } => {
                Specialist::HackerNewsAgent
            }
            ToolCall::DepedRssFeed { .. } => Specialist::DepedAgent,
            ToolCall::WebSearch { .. } => Specialist::SearchAssistant,
        }
    }
}

/// What a tool hands back to its agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResponse {
    Success {
        #[serde(skip_serializing_if = "Option::is_none")]
        feed_info: Option<FeedInfo>,
        items: Vec<FeedItem>,
    },
    Error {
        error_message: String,
    },
}

impl ToolResponse {
    pub fn success(items: Vec<FeedItem>) -> Self {
        ToolResponse::Success {
            feed_info: None,
            items,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ToolResponse::Error {
            error_message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolResponse::Error { .. })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Plain-text rendering: a numbered list, one block per item.
impl fmt::Display for ToolResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolResponse::Error { error_message } => write!(f, "Error: {error_message}"),
            ToolResponse::Success { feed_info, items } => {
                let mut out = String::new();
                if let Some(title) = feed_info.as_ref().and_then(|i| i.title.as_deref()) {
                    writeln!(out, "{title}\n")?;
                }
                if items.is_empty() {
                    out.push_str("No items found.");
                }
                for (n, item) in items.iter().enumerate() {
                    writeln!(out, "{}. {}", n + 1, item.title)?;
                    writeln!(out, "   {}", item.url)?;

                    let mut meta = Vec::new();
                    if let Some(date) = item.formatted_date() {
                        meta.push(date);
                    }
                    if let Some(creator) = &item.creator {
                        meta.push(format!("by {creator}"));
                    }
                    if !item.categories.is_empty() {
                        meta.push(item.categories.join(", "));
                    }
                    if !meta.is_empty() {
                        writeln!(out, "   {}", meta.join(" · "))?;
                    }
                    if let Some(summary) = &item.summary {
                        writeln!(out, "   {summary}")?;
                    }
                }
                f.write_str(out.trim_end())
            }
        }
    }
}

/// The set of specialist tools, bound to a fetcher and fixed endpoints.
#[derive(Debug, Clone)]
pub struct Toolbox {
    fetcher: Fetcher,
    sources: SourcesConfig,
}

impl Toolbox {
    pub fn new(fetcher: Fetcher, sources: SourcesConfig) -> Self {
        Self { fetcher, sources }
    }

    /// Dispatch a resolved call to its tool.
    #[instrument(level = "info", skip(self), fields(tool = call.name()))]
    pub async fn call(&self, call: &ToolCall) -> ToolResponse {
        let response = match call {
            ToolCall::HackerNewsPosts { number_of_posts } => {
                self.get_hackernews_posts(*number_of_posts).await
            }
            ToolCall::GithubTrendingRepos { number_of_repos } => {
                self.get_github_trending_repos(*number_of_repos).await
            }
            ToolCall::DepedRssFeed { max_items } => self.get_deped_rss_feed(*max_items).await,
            ToolCall::WebSearch { query } => self.web_search(query).await,
        };
        match &response {
            ToolResponse::Success { items, .. } => info!(count = items.len(), "Tool succeeded"),
            ToolResponse::Error { error_message } => warn!(error = %error_message, "Tool failed"),
        }
        response
    }

    /// Top Hacker News posts with title and link.
    ///
    /// # Arguments
    ///
    /// * `number_of_posts` - Keep at most this many posts; `None` keeps every
    ///   post on the front page
    ///
    /// # Returns
    ///
    /// Posts in page order, or an error response when the page cannot be
    /// fetched.
    pub async fn get_hackernews_posts(&self, number_of_posts: Option<usize>) -> ToolResponse {
        let url = &self.sources.hackernews_url;
        match self.fetch_html(url, scrapers::parse_hackernews).await {
            Ok(posts) => ToolResponse::success(truncate(posts, number_of_posts)),
            Err(e) => {
                ToolResponse::error(format!("Error when trying to get hackernews posts: {e}"))
            }
        }
    }

    /// Trending GitHub repositories as `owner/repo` with link.
    ///
    /// # Arguments
    ///
    /// * `number_of_repos` - Keep at most this many repositories; `None` keeps
    ///   the whole list
    pub async fn get_github_trending_repos(&self, number_of_repos: Option<usize>) -> ToolResponse {
        let url = &self.sources.github_trending_url;
        match self.fetch_html(url, scrapers::parse_github_trending).await {
            Ok(repos) => ToolResponse::success(truncate(repos, number_of_repos)),
            Err(e) => {
                ToolResponse::error(format!("Error when trying to get trending repos: {e}"))
            }
        }
    }

    /// Latest DepEd news items plus channel info.
    ///
    /// The configured feed endpoints are tried in order, once each.
    ///
    /// # Arguments
    ///
    /// * `max_items` - Maximum number of items to return
    ///
    /// # Returns
    ///
    /// A success response carrying [`FeedInfo`] and up to `max_items` items,
    /// or an error response naming the HTTP status or the XML problem.
    pub async fn get_deped_rss_feed(&self, max_items: usize) -> ToolResponse {
        match self.fetch_deped_feed().await {
            Ok(Feed { info, items }) => ToolResponse::Success {
                feed_info: Some(info),
                items: truncate(items, Some(max_items)),
            },
            Err(IngestError::Fetch(FetchError::Status { status, .. })) => ToolResponse::error(
                format!("Failed to fetch RSS feed. Status code: {}", status.as_u16()),
            ),
            Err(IngestError::Fetch(e)) => {
                ToolResponse::error(format!("Failed to fetch RSS feed: {e}"))
            }
            Err(IngestError::Parse(e)) => {
                ToolResponse::error(format!("Failed to parse RSS feed XML: {}", e.message))
            }
        }
    }

    /// Web search results for a free-text query.
    ///
    /// # Arguments
    ///
    /// * `query` - The search terms; a blank query is an error response
    pub async fn web_search(&self, query: &str) -> ToolResponse {
        if query.trim().is_empty() {
            return ToolResponse::error("Search query is empty");
        }
        let url = scrapers::search_url(&self.sources.search_url, query);
        match self.fetch_html(&url, scrapers::parse_search_results).await {
            Ok(results) => ToolResponse::success(results),
            Err(e) => ToolResponse::error(format!("Error when trying to search the web: {e}")),
        }
    }

    async fn fetch_deped_feed(&self) -> Result<Feed, IngestError> {
        let body = self
            .fetcher
            .fetch_first(&self.sources.deped_feed_urls, None)
            .await?;
        Ok(scrapers::parse_rss(&body)?)
    }

    async fn fetch_html(
        &self,
        url: &str,
        extract: fn(&str) -> Vec<FeedItem>,
    ) -> Result<Vec<FeedItem>, FetchError> {
        let body = self.fetcher.fetch(url, None).await?;
        let items = extract(&body);
        if items.is_empty() {
            warn!(%url, bytes = body.len(), "Page yielded no items; markup may have changed");
        }
        Ok(items)
    }
}

fn truncate(mut items: Vec<FeedItem>, limit: Option<usize>) -> Vec<FeedItem> {
    if let Some(n) = limit {
        items.truncate(n);
    }
    items
}
