//! last30days Provider - LLM-backed search capabilities
//!
//! - [`RedditSearch`]: Reddit threads via an OpenAI search model
//! - [`XSearch`]: X posts via an xAI (OpenAI-compatible) endpoint
//! - [`RedditThreadEnricher`]: full-thread detail from Reddit's JSON API
//! - [`ModelSelector`]: which model each capability targets
//! - [`mock`]: fixture-backed doubles for `--mock` runs and tests

#![deny(unsafe_code, unused_imports, unused_variables, missing_docs)]

pub mod enrich;
pub mod error;
pub mod mock;
pub mod models;
mod parse;
mod prompts;
pub mod search;

pub use enrich::RedditThreadEnricher;
pub use error::{ProviderError, Result};
pub use models::ModelSelector;
pub use search::{RedditSearch, SearchClientConfig, XSearch};

use async_trait::async_trait;
use last30days_types::{RawItem, ResearchQuery, Source, ThreadDetail};
use std::time::Duration;

/// A source-scoped search capability.
///
/// No recency guarantee is made: callers must filter results themselves.
#[async_trait]
pub trait SearchCapability: Send + Sync {
    /// Source this capability searches
    fn source(&self) -> Source;

    /// Model identifier the capability targets
    fn model(&self) -> &str;

    /// Search `query.topic` within `[query.from, query.to]`
    async fn search(&self, query: &ResearchQuery) -> Result<Vec<RawItem>>;
}

/// Fetches full-thread detail for a Reddit hit
#[async_trait]
pub trait ThreadEnricher: Send + Sync {
    /// Enrich the thread at `url`, giving up after `timeout`
    async fn enrich(&self, url: &str, timeout: Duration) -> Result<ThreadDetail>;
}
