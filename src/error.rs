//! Error types for ingestion, routing and LLM calls.
//!
//! Ingestion has exactly two failure kinds: the body could not be fetched
//! ([`FetchError`]) or it could not be parsed ([`ParseError`]). HTML
//! extractors never fail; a page without the expected markup yields an
//! empty list instead.

use thiserror::Error;

/// A network or HTTP failure while retrieving a source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} when fetching {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("no URL configured for this source")]
    NoUrl,
}

/// A malformed XML document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to parse RSS feed XML at byte {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: u64,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: u64) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

/// Either half of a fetch-then-extract pipeline failing.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure talking to the chat completion endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no LLM provider configured")]
    Disabled,

    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM endpoint returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("LLM response contained no message content")]
    EmptyResponse,
}

/// The router could not pick a tool for a query.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("router reply was not a valid tool choice: {0}")]
    InvalidChoice(String),
}
