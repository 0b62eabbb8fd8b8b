//! # info_hub
//!
//! An information hub that answers questions by delegating to specialist
//! agents:
//!
//! - **search_assistant**: general web search
//! - **hackernews_agent**: top Hacker News posts and trending GitHub repositories
//! - **deped_agent**: the latest news from the Department of Education (DepEd)
//!   RSS feed
//!
//! ## Usage
//!
//! ```sh
//! info_hub "top 5 trending repos on github"
//! INFO_HUB_API_KEY=... info_hub --router llm "what did DepEd announce this week?"
//! ```
//!
//! ## Architecture
//!
//! 1. **Routing**: a keyword or LLM router maps the query to a tool call
//! 2. **Fetching**: one HTTP GET against the tool's fixed source
//! 3. **Extraction**: RSS or HTML is parsed into `FeedItem` records
//! 4. **Answering**: the records are rendered as text, or phrased by the LLM

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod agents;
mod api;
mod cli;
mod config;
mod coordinator;
mod error;
mod fetcher;
mod models;
mod router;
mod scrapers;
mod tools;
mod utils;

use api::ChatClient;
use cli::{Cli, OutputFormat};
use config::{HubConfig, RouterKind};
use coordinator::Coordinator;
use fetcher::Fetcher;
use router::{AnyRouter, KeywordRouter, LlmRouter};
use tools::Toolbox;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init (stderr, so stdout carries only the answer) ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.config, ?args.router, ?args.tool, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = match &args.config {
        Some(path) => HubConfig::load(path)?,
        None => HubConfig::default(),
    };
    args.apply_overrides(&mut config);
    info!(
        router = ?config.router,
        provider = ?config.llm.provider,
        llm_enabled = config.llm.is_enabled(),
        timeout_secs = config.http.timeout_secs,
        "Configuration resolved"
    );

    // ---- Components ----
    let fetcher = Fetcher::new(&config.http)?;
    let toolbox = Toolbox::new(fetcher, config.sources.clone());

    let llm = if config.llm.is_enabled() {
        let http = &config.http;
        match ChatClient::from_config(&config.llm, http.timeout(), http.use_env_proxy) {
            Ok(client) => {
                info!(model = client.model(), "LLM client ready");
                Some(client)
            }
            Err(e) => {
                warn!(error = %e, "Could not build LLM client; continuing without it");
                None
            }
        }
    } else {
        None
    };

    let router = match (config.router, &llm) {
        (RouterKind::Llm, Some(client)) => {
            AnyRouter::Llm(LlmRouter::new(client.clone(), config.default_max_items))
        }
        (RouterKind::Llm, None) => {
            warn!("LLM routing requested without a usable LLM; using keyword routing");
            AnyRouter::Keyword(KeywordRouter::new(config.default_max_items))
        }
        (RouterKind::Keyword, _) => {
            AnyRouter::Keyword(KeywordRouter::new(config.default_max_items))
        }
    };

    let coordinator = Coordinator::new(router, toolbox, llm);

    // ---- Answer ----
    let query = args.query_text();
    let answer = match args.tool_call(&config) {
        Some(call) => coordinator.run(&query, call).await,
        None => coordinator.answer(&query).await,
    };

    match args.format {
        OutputFormat::Text => println!("{}", answer.text),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&answer)?),
    }

    let elapsed = start_time.elapsed();
    info!(
        specialist = %answer.specialist,
        tool = answer.tool,
        failed = answer.response.is_error(),
        fell_back = answer.fallback_reason.is_some(),
        millis = elapsed.as_millis() as u64,
        "Execution complete"
    );

    Ok(())
}
