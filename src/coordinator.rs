//! The coordinator: route a query, run the specialist's tool, phrase the answer.
//!
//! Flow for one turn:
//! 1. The [`Router`] picks a [`ToolCall`]. If routing fails the query goes to
//!    web search.
//! 2. The [`Toolbox`] runs the call. When a specialist other than the search
//!    assistant reports an error, the same query is retried once as a web
//!    search so the user still gets something useful.
//! 3. With an LLM configured, the specialist's instruction and the tool output
//!    are sent to the model to phrase the reply. Without one (or if the model
//!    call fails) the tool's plain-text rendering is the answer.

use crate::agents::Specialist;
use crate::api::{AskAsync, Prompt};
use crate::router::Router;
use crate::tools::{ToolCall, ToolResponse, Toolbox};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// The outcome of one coordinator turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub specialist: Specialist,
    pub tool: &'static str,
    pub response: ToolResponse,
    /// Set when the routed specialist failed and web search answered instead.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub text: String,
}

pub struct Coordinator<R, L> {
    router: R,
    toolbox: Toolbox,
    llm: Option<L>,
}

impl<R: Router, L: AskAsync> Coordinator<R, L> {
    pub fn new(router: R, toolbox: Toolbox, llm: Option<L>) -> Self {
        Self {
            router,
            toolbox,
            llm,
        }
    }

    /// Answer a natural-language query.
    #[instrument(level = "info", skip(self))]
    pub async fn answer(&self, query: &str) -> Answer {
        let call = match self.router.route(query).await {
            Ok(call) => call,
            Err(e) => {
                warn!(error = %e, "Routing failed; using web search");
                ToolCall::WebSearch {
                    query: query.trim().to_string(),
                }
            }
        };
        info!(tool = call.name(), specialist = %call.specialist(), "Routed query");
        self.run(query, call).await
    }

    /// Run an already-resolved call, skipping the router.
    pub async fn run(&self, query: &str, call: ToolCall) -> Answer {
        let mut call = call;
        let mut response = self.toolbox.call(&call).await;
        let mut fallback_reason = None;

        if let ToolResponse::Error { error_message } = &response {
            if call.specialist() != Specialist::SearchAssistant && !query.trim().is_empty() {
                warn!(
                    specialist = %call.specialist(),
                    error = %error_message,
                    "Specialist failed; falling back to web search"
                );
                let fallback = ToolCall::WebSearch {
                    query: query.trim().to_string(),
                };
                let fallback_response = self.toolbox.call(&fallback).await;
                if !fallback_response.is_error() {
                    fallback_reason = Some(format!(
                        "{} could not retrieve data: {error_message}",
                        call.specialist()
                    ));
                    call = fallback;
                    response = fallback_response;
                }
            }
        }

        let text = self
            .phrase(query, &call, &response, fallback_reason.as_deref())
            .await;

        Answer {
            specialist: call.specialist(),
            tool: call.name(),
            response,
            fallback_reason,
            text,
        }
    }

    async fn phrase(
        &self,
        query: &str,
        call: &ToolCall,
        response: &ToolResponse,
        fallback_reason: Option<&str>,
    ) -> String {
        let mut plain = String::new();
        if let Some(reason) = fallback_reason {
            plain.push_str(&format!("Note: {reason}. Showing web search results instead.\n\n"));
        }
        plain.push_str(&response.to_string());

        let Some(llm) = &self.llm else {
            return plain;
        };

        let tool_output = response.to_json().unwrap_or_else(|_| response.to_string());
        let mut user = format!(
            "User question: {query}\n\nThe tool `{}` returned:\n{tool_output}",
            call.name()
        );
        if let Some(reason) = fallback_reason {
            user.push_str(&format!(
                "\n\nNote: {reason}. Tell the user these are web search results instead."
            ));
        }

        let prompt = Prompt::new(call.specialist().card().instruction, user);
        match llm.ask(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Answer phrasing failed; returning raw tool output");
                plain
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::ScriptedLlm;
    use crate::config::SourcesConfig;
    use crate::error::LlmError;
    use crate::fetcher::Fetcher;
    use crate::fetcher::test_server::{local_http, serve};
    use crate::router::KeywordRouter;

    const HN_PAGE: &str = r#"<table><tr class="athing"><td><span class="titleline"><a href="https://a.example/">First</a></span></td></tr></table>"#;

    const SEARCH_PAGE: &str = r#"<div class="result"><a class="result__a" href="https://www.deped.gov.ph/news">DepEd news</a></div>"#;

    fn sources(base: &str) -> SourcesConfig {
        SourcesConfig {
            hackernews_url: format!("{base}/news"),
            github_trending_url: format!("{base}/trending"),
            deped_feed_urls: vec![format!("{base}/feed/")],
            search_url: format!("{base}/html/?q="),
        }
    }

    fn coordinator(
        base: &str,
        llm: Option<ScriptedLlm>,
    ) -> Coordinator<KeywordRouter, ScriptedLlm> {
        let toolbox = Toolbox::new(Fetcher::new(&local_http()).unwrap(), sources(base));
        Coordinator::new(KeywordRouter::new(10), toolbox, llm)
    }

    #[tokio::test]
    async fn test_answer_without_llm_is_tool_text() {
        let base = serve(vec![("200 OK", HN_PAGE.to_string())]).await;
        let answer = coordinator(&base, None).answer("top hacker news posts").await;
        assert_eq!(answer.specialist, Specialist::HackerNewsAgent);
        assert_eq!(answer.tool, "get_hackernews_posts");
        assert_eq!(answer.fallback_reason, None);
        assert_eq!(answer.text, "1. First\n   https://a.example/");
    }

    #[tokio::test]
    async fn test_failed_specialist_falls_back_to_search() {
        let base = serve(vec![
            ("503 Service Unavailable", String::new()),
            ("200 OK", SEARCH_PAGE.to_string()),
        ])
        .await;
        let answer = coordinator(&base, None).answer("latest DepEd news").await;
        assert_eq!(answer.specialist, Specialist::SearchAssistant);
        assert_eq!(answer.tool, "web_search");
        let reason = answer.fallback_reason.as_deref().unwrap();
        assert!(reason.starts_with("deped_agent could not retrieve data"));
        assert!(answer.text.contains("DepEd news"));
        assert!(answer.text.starts_with("Note: deped_agent"));
    }

    #[tokio::test]
    async fn test_failed_fallback_keeps_original_error() {
        let base = serve(vec![
            ("503 Service Unavailable", String::new()),
            ("500 Internal Server Error", String::new()),
        ])
        .await;
        let answer = coordinator(&base, None).answer("latest DepEd news").await;
        assert_eq!(answer.specialist, Specialist::DepedAgent);
        assert_eq!(
            answer.response,
            ToolResponse::error("Failed to fetch RSS feed. Status code: 503")
        );
        assert_eq!(answer.fallback_reason, None);
    }

    #[tokio::test]
    async fn test_llm_phrases_answer_with_specialist_instruction() {
        let base = serve(vec![("200 OK", HN_PAGE.to_string())]).await;
        let llm = ScriptedLlm::new(vec![Ok("Here is the top post: First.".to_string())]);
        let coordinator = coordinator(&base, Some(llm));
        let answer = coordinator.answer("hacker news").await;
        assert_eq!(answer.text, "Here is the top post: First.");

        let prompts = coordinator.llm.as_ref().unwrap().prompts.borrow();
        assert_eq!(
            prompts[0].system,
            Specialist::HackerNewsAgent.card().instruction
        );
        assert!(prompts[0].user.contains("\"title\": \"First\""));
    }

    #[tokio::test]
    async fn test_llm_failure_returns_plain_text() {
        let base = serve(vec![("200 OK", HN_PAGE.to_string())]).await;
        let llm = ScriptedLlm::new(vec![Err(LlmError::EmptyResponse)]);
        let answer = coordinator(&base, Some(llm)).answer("hacker news").await;
        assert_eq!(answer.text, "1. First\n   https://a.example/");
    }

    #[tokio::test]
    async fn test_run_skips_router() {
        let base = serve(vec![("200 OK", HN_PAGE.to_string())]).await;
        let answer = coordinator(&base, None)
            .run("", ToolCall::HackerNewsPosts { number_of_posts: Some(1) })
            .await;
        assert_eq!(answer.tool, "get_hackernews_posts");
        assert!(!answer.response.is_error());
    }
}
