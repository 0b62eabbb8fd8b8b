//! Explicit runtime configuration.
//!
//! Everything that performs an outbound call receives its settings from a
//! [`HubConfig`] value rather than reading the environment itself. The config
//! is assembled once at startup: built-in defaults, then an optional YAML
//! file, then command-line flags and environment variables (see
//! [`crate::cli::Cli::apply_overrides`]).
//!
//! # Example file
//!
//! ```yaml
//! llm:
//!   provider: openai
//!   model: gpt-4o-mini
//! http:
//!   timeout_secs: 5
//! router: keyword
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Which chat completion backend to talk to, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    #[value(name = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    /// No LLM: keyword routing and raw tool output only.
    None,
}

impl Provider {
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Provider::Gemini => Some("https://generativelanguage.googleapis.com/v1beta/openai"),
            Provider::OpenAi => Some("https://api.openai.com/v1"),
            Provider::None => None,
        }
    }

    pub fn default_model(self) -> Option<&'static str> {
        match self {
            Provider::Gemini => Some("gemini-2.5-flash"),
            Provider::OpenAi => Some("gpt-4o-mini"),
            Provider::None => None,
        }
    }
}

/// How the coordinator picks a specialist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RouterKind {
    #[default]
    Keyword,
    Llm,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    pub api_key: Option<String>,
    /// Overrides the provider's default model.
    pub model: Option<String>,
    /// Overrides the provider's default OpenAI-compatible base URL.
    pub base_url: Option<String>,
}

impl LlmConfig {
    /// True when a provider is selected and an API key is present.
    pub fn is_enabled(&self) -> bool {
        self.provider != Provider::None
            && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn resolved_model(&self) -> Option<String> {
        self.model
            .clone()
            .or_else(|| self.provider.default_model().map(str::to_string))
    }

    pub fn resolved_base_url(&self) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| self.provider.default_base_url().map(str::to_string))
            .map(|u| u.trim_end_matches('/').to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    /// Honor `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub use_env_proxy: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
            use_env_proxy: true,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Fixed endpoints for each specialist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub hackernews_url: String,
    pub github_trending_url: String,
    /// Tried in order; the first successful response wins.
    pub deped_feed_urls: Vec<String>,
    /// Search endpoint; the URL-encoded query is appended.
    pub search_url: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            hackernews_url: "https://news.ycombinator.com/".to_string(),
            github_trending_url: "https://github.com/trending".to_string(),
            deped_feed_urls: vec![
                "https://www.deped.gov.ph/feed/".to_string(),
                "https://www.deped.gov.ph/feed".to_string(),
            ],
            search_url: "https://html.duckduckgo.com/html/?q=".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub llm: LlmConfig,
    pub http: HttpConfig,
    pub sources: SourcesConfig,
    pub router: RouterKind,
    /// Item cap for the DepEd feed when the query does not give one.
    pub default_max_items: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            http: HttpConfig::default(),
            sources: SourcesConfig::default(),
            router: RouterKind::default(),
            default_max_items: 10,
        }
    }
}

impl HubConfig {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Load a YAML config file from disk.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&raw)?;
        info!(
            router = ?config.router,
            provider = ?config.llm.provider,
            "Loaded configuration file"
        );
        Ok(config)
    }
}
