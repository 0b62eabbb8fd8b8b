//! Pluggable query routing.
//!
//! A [`Router`] turns a natural-language query into a [`ToolCall`]. Two
//! implementations are provided:
//!
//! - [`KeywordRouter`]: a fixed rule table, deterministic and offline
//! - [`LlmRouter`]: asks a model to pick the tool and its arguments
//!
//! Routing is kept apart from extraction; neither knows about the other.

use crate::agents::{COORDINATOR, Specialist};
use crate::api::{AskAsync, Prompt};
use crate::error::RouteError;
use crate::tools::ToolCall;
use crate::utils::{strip_code_fences, truncate_for_log};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Chooses the tool that should answer a query.
pub trait Router {
    async fn route(&self, query: &str) -> Result<ToolCall, RouteError>;
}

static DEPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(deped|department of education)\b").expect("static regex")
});
// Education topics only count together with a news-like word.
static EDUCATION_TOPIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(education|schools?|teachers?|students?|enrol(l)?ment|classes)\b")
        .expect("static regex")
});
static EDUCATION_NEWS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(news|memos?|memorand(a|um)|updates?|announce(d|ments?)?|advisor(y|ies)|issuances?|press releases?)\b",
    )
    .expect("static regex")
});
static GITHUB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(github|repos?|repositories)\b").expect("static regex")
});
static HACKERNEWS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(hacker\s*news|hn|tech news|ycombinator)\b").expect("static regex")
});
static COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:top|latest|first|recent|last)\s+(\d{1,3})\b|\b(\d{1,3})\s+(?:\w+\s+)?(?:posts?|repos?|repositories|items?|stories|articles|news|updates|results)\b",
    )
    .expect("static regex")
});

/// Rule-based router. Checked in order: DepEd (named outright, or an
/// education topic asked about as news), GitHub, Hacker News, and
/// everything else goes to web search.
#[derive(Debug, Clone)]
pub struct KeywordRouter {
    default_max_items: usize,
}

impl KeywordRouter {
    pub fn new(default_max_items: usize) -> Self {
        Self { default_max_items }
    }

    /// Classify synchronously; keyword routing cannot fail.
    pub fn classify(&self, query: &str) -> ToolCall {
        let count = requested_count(query);
        if is_deped(query) {
            ToolCall::DepedRssFeed {
                max_items: count.unwrap_or(self.default_max_items),
            }
        } else if GITHUB.is_match(query) {
            ToolCall::GithubTrendingRepos {
                number_of_repos: count,
            }
        } else if HACKERNEWS.is_match(query) {
            ToolCall::HackerNewsPosts {
                number_of_posts: count,
            }
        } else {
            ToolCall::WebSearch {
                query: query.trim().to_string(),
            }
        }
    }
}

impl Router for KeywordRouter {
    async fn route(&self, query: &str) -> Result<ToolCall, RouteError> {
        let call = self.classify(query);
        debug!(tool = call.name(), "Keyword route");
        Ok(call)
    }
}

fn is_deped(query: &str) -> bool {
    DEPED.is_match(query) || (EDUCATION_TOPIC.is_match(query) && EDUCATION_NEWS.is_match(query))
}

/// Pull a requested item count out of phrases like "top 5" or "3 repos".
fn requested_count(query: &str) -> Option<usize> {
    let caps = COUNT.captures(query)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|n: &usize| *n > 0)
}

/// The JSON object the model is asked to reply with.
#[derive(Debug, Deserialize)]
struct RouteChoice {
    tool: String,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    query: Option<String>,
}

/// Router that delegates the choice to an LLM.
#[derive(Debug)]
pub struct LlmRouter<L> {
    llm: L,
    default_max_items: usize,
}

impl<L: AskAsync> LlmRouter<L> {
    pub fn new(llm: L, default_max_items: usize) -> Self {
        Self {
            llm,
            default_max_items,
        }
    }

    #[cfg(test)]
    pub fn llm(&self) -> &L {
        &self.llm
    }

    fn system_prompt() -> String {
        let agents = Specialist::ALL
            .iter()
            .map(|s| format!("- {}: {}", s.name(), s.card().description))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "{instruction}\n\nAgents:\n{agents}\n\nTools:\n\
- get_hackernews_posts (hackernews_agent): top Hacker News posts. limit = number of posts or null for all.\n\
- get_github_trending_repos (hackernews_agent): trending GitHub repositories. limit = number of repos or null for all.\n\
- get_deped_rss_feed (deped_agent): latest DepEd news. limit = maximum items or null for the default.\n\
- web_search (search_assistant): general web search. query = the search terms.\n\n\
Reply with a single JSON object and nothing else:\n\
{{\"tool\": \"<tool name>\", \"limit\": <integer or null>, \"query\": \"<search terms or null>\"}}",
            instruction = COORDINATOR.instruction,
        )
    }

    fn to_call(&self, choice: RouteChoice, query: &str) -> Result<ToolCall, RouteError> {
        let call = match choice.tool.trim() {
            "get_hackernews_posts" => ToolCall::HackerNewsPosts {
                number_of_posts: choice.limit,
            },
            "get_github_trending_repos" => ToolCall::GithubTrendingRepos {
                number_of_repos: choice.limit,
            },
            "get_deped_rss_feed" => ToolCall::DepedRssFeed {
                max_items: choice.limit.unwrap_or(self.default_max_items),
            },
            "web_search" => ToolCall::WebSearch {
                query: choice
                    .query
                    .filter(|q| !q.trim().is_empty())
                    .unwrap_or_else(|| query.trim().to_string()),
            },
            other => return Err(RouteError::InvalidChoice(format!("unknown tool {other:?}"))),
        };
        Ok(call)
    }
}

impl<L: AskAsync> Router for LlmRouter<L> {
    #[instrument(level = "info", skip_all)]
    async fn route(&self, query: &str) -> Result<ToolCall, RouteError> {
        let prompt = Prompt::new(Self::system_prompt(), query);
        let reply = self.llm.ask(&prompt).await?;
        let choice: RouteChoice = serde_json::from_str(strip_code_fences(&reply)).map_err(|e| {
            warn!(error = %e, reply = %truncate_for_log(&reply, 200), "Router reply was not JSON");
            RouteError::InvalidChoice(truncate_for_log(&reply, 200))
        })?;
        let call = self.to_call(choice, query)?;
        debug!(tool = call.name(), "LLM route");
        Ok(call)
    }
}

/// Router selected at runtime from configuration.
#[derive(Debug)]
pub enum AnyRouter<L> {
    Keyword(KeywordRouter),
    Llm(LlmRouter<L>),
}

impl<L: AskAsync> Router for AnyRouter<L> {
    async fn route(&self, query: &str) -> Result<ToolCall, RouteError> {
        match self {
            AnyRouter::Keyword(r) => r.route(query).await,
            AnyRouter::Llm(r) => r.route(query).await,
        }
    }
}
