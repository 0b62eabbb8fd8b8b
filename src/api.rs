//! LLM access over an OpenAI-compatible chat completion API.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait for sending a prompt and receiving text back
//! - [`ChatClient`]: `reqwest` implementation for Gemini's and OpenAI's
//!   `/chat/completions` endpoints
//!
//! Both the LLM router and the coordinator's answer phrasing go through
//! [`AskAsync`], so tests can swap in a scripted implementation.
//!
//! Calls are made once; there is no retry or backoff.

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// A system instruction plus the user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Trait for async LLM interaction.
///
/// Implementors send a prompt to a model and return the text of its reply.
pub trait AskAsync {
    async fn ask(&self, prompt: &Prompt) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct ChatClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl ChatClient {
    /// Build a client from config. Fails with [`LlmError::Disabled`] when no
    /// provider or API key is configured.
    pub fn from_config(
        config: &LlmConfig,
        timeout: Duration,
        use_env_proxy: bool,
    ) -> Result<Self, LlmError> {
        if !config.is_enabled() {
            return Err(LlmError::Disabled);
        }
        let (Some(base_url), Some(model), Some(api_key)) = (
            config.resolved_base_url(),
            config.resolved_model(),
            config.api_key.clone(),
        ) else {
            return Err(LlmError::Disabled);
        };

        // Model replies are slower than page fetches.
        let mut builder = Client::builder().timeout(timeout.max(Duration::from_secs(60)));
        if !use_env_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            api_key,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl AskAsync for ChatClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: 0.0,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, elapsed_ms = t0.elapsed().as_millis() as u64, "API call failed");
            return Err(LlmError::Status {
                status,
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            reply = %truncate_for_log(&content, 300),
            "API call succeeded"
        );
        Ok(content)
    }
}
