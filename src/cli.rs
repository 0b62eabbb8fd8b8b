//! Command-line interface definitions for info_hub.
//!
//! Flags override the YAML config file, which overrides built-in defaults.
//! LLM settings can also come from environment variables.

use crate::config::{HubConfig, Provider, RouterKind};
use crate::tools::ToolCall;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for info_hub.
///
/// # Examples
///
/// ```sh
/// # Keyword routing, no LLM
/// info_hub "top 5 hacker news posts"
///
/// # Route and phrase with Gemini
/// INFO_HUB_API_KEY=... info_hub --router llm "any new DepEd memoranda?"
///
/// # Call a tool directly and print JSON
/// info_hub --tool get_deped_rss_feed --limit 3 --format json deped
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// The question to answer
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How to pick the specialist
    #[arg(long, value_enum, env = "INFO_HUB_ROUTER")]
    pub router: Option<RouterKind>,

    /// LLM provider used for routing and phrasing answers
    #[arg(long, value_enum, env = "INFO_HUB_PROVIDER")]
    pub provider: Option<Provider>,

    /// API key for the LLM provider
    #[arg(long, env = "INFO_HUB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model name, overriding the provider default
    #[arg(long, env = "INFO_HUB_MODEL")]
    pub model: Option<String>,

    /// OpenAI-compatible base URL, overriding the provider default
    #[arg(long, env = "INFO_HUB_BASE_URL")]
    pub base_url: Option<String>,

    /// HTTP timeout in seconds for source fetches
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Default number of DepEd feed items
    #[arg(long)]
    pub max_items: Option<usize>,

    /// Call this tool directly instead of routing the query
    #[arg(long, value_enum)]
    pub tool: Option<ToolName>,

    /// Item limit for --tool
    #[arg(long, requires = "tool")]
    pub limit: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ToolName {
    #[value(name = "get_hackernews_posts")]
    HackernewsPosts,
    #[value(name = "get_github_trending_repos")]
    GithubTrendingRepos,
    #[value(name = "get_deped_rss_feed")]
    DepedRssFeed,
    #[value(name = "web_search")]
    WebSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The answer text
    Text,
    /// The full answer, including the raw tool response, as JSON
    Json,
}

impl Cli {
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }

    /// Layer flag and environment values over a loaded config.
    pub fn apply_overrides(&self, config: &mut HubConfig) {
        if let Some(router) = self.router {
            config.router = router;
        }
        if let Some(provider) = self.provider {
            config.llm.provider = provider;
        }
        if let Some(key) = &self.api_key {
            config.llm.api_key = Some(key.clone());
        }
        if let Some(model) = &self.model {
            config.llm.model = Some(model.clone());
        }
        if let Some(base_url) = &self.base_url {
            config.llm.base_url = Some(base_url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config.http.timeout_secs = secs;
        }
        if let Some(n) = self.max_items {
            config.default_max_items = n;
        }
    }

    /// The direct tool call requested with `--tool`, if any.
    pub fn tool_call(&self, config: &HubConfig) -> Option<ToolCall> {
        let call = match self.tool? {
            ToolName::HackernewsPosts => ToolCall::HackerNewsPosts {
                number_of_posts: self.limit,
            },
            ToolName::GithubTrendingRepos => ToolCall::GithubTrendingRepos {
                number_of_repos: self.limit,
            },
            ToolName::DepedRssFeed => ToolCall::DepedRssFeed {
                max_items: self.limit.unwrap_or(config.default_max_items),
            },
            ToolName::WebSearch => ToolCall::WebSearch {
                query: self.query_text(),
            },
        };
        Some(call)
    }
}
