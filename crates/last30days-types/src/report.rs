use crate::{Depth, RawItem, ScoredItem, Source, SourceMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Model identifier each search capability targeted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsUsed {
    pub reddit: Option<String>,
    pub x: Option<String>,
}

impl ModelsUsed {
    pub fn get(&self, source: Source) -> Option<&str> {
        match source {
            Source::Reddit => self.reddit.as_deref(),
            Source::X => self.x.as_deref(),
        }
    }
}

/// Instruction for the caller to run a generic web search itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchDirective {
    pub topic: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub exclude_domains: Vec<String>,
}

/// Raw hits exactly as fetched (after enrichment), before any filtering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamPayloads {
    pub reddit: Vec<RawItem>,
    pub x: Vec<RawItem>,
}

/// Result of one research run. Read-only once assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub topic: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub mode: SourceMode,
    pub depth: Depth,
    pub models_used: ModelsUsed,
    pub reddit: Vec<ScoredItem>,
    pub x: Vec<ScoredItem>,
    pub reddit_error: Option<String>,
    pub x_error: Option<String>,
    /// Non-fatal problems (failed enrichments and the like)
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search: Option<WebSearchDirective>,
    pub context_snippet: String,
    /// Everything the search capabilities returned, for offline debugging
    #[serde(default)]
    pub upstream: UpstreamPayloads,
}

impl Report {
    pub fn items(&self, source: Source) -> &[ScoredItem] {
        match source {
            Source::Reddit => &self.reddit,
            Source::X => &self.x,
        }
    }

    pub fn error(&self, source: Source) -> Option<&str> {
        match source {
            Source::Reddit => self.reddit_error.as_deref(),
            Source::X => self.x_error.as_deref(),
        }
    }

    /// Whether the source was part of this run
    pub fn covers(&self, source: Source) -> bool {
        match source {
            Source::Reddit => self.mode.wants_reddit(),
            Source::X => self.mode.wants_x(),
        }
    }
}
