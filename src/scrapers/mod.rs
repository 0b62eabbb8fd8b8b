//! Content extractors for each source.
//!
//! Every extractor is a pure function from a raw body to records: the same
//! input always yields the same output, in source document order.
//!
//! # Supported Sources
//!
//! | Source | Module | Format | On unexpected markup |
//! |--------|--------|--------|----------------------|
//! | DepEd news feed | [`rss`] | RSS 2.0 | [`ParseError`](crate::error::ParseError) |
//! | Hacker News front page | [`hackernews`] | HTML | empty list |
//! | GitHub trending | [`github`] | HTML | empty list |
//! | DuckDuckGo results | [`search`] | HTML | empty list |
//!
//! The HTML extractors cannot tell a redesigned page from a page that simply
//! has nothing on it; the tools log a warning when they come back empty.

pub mod github;
pub mod hackernews;
pub mod rss;
pub mod search;

pub use github::parse_github_trending;
pub use hackernews::parse_hackernews;
pub use rss::parse_rss;
pub use search::{parse_search_results, search_url};
