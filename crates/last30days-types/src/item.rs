use crate::{RawItem, Source};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How much the resolved timestamp can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateConfidence {
    High,
    Med,
    Low,
}

/// One hit mapped into the source-independent schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub source: Source,
    /// Canonical URL; the sole equality key within a source
    pub identity_key: String,
    /// URL as reported upstream
    pub url: String,
    pub title: String,
    pub author_or_handle: Option<String>,
    pub text: Option<String>,
    /// Subreddit for Reddit hits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub timestamp_valid: bool,
    pub date_confidence: DateConfidence,
    /// Source-specific raw signals (upvotes, comments, likes, ...)
    pub engagement: BTreeMap<String, f64>,
    /// Model-reported relevance in `[0, 1]`
    pub relevance: f64,
    pub why_relevant: Option<String>,
    pub raw_ref: RawItem,
}

impl NormalizedItem {
    pub fn engagement_value(&self, key: &str) -> f64 {
        self.engagement.get(key).copied().unwrap_or(0.0)
    }

    pub fn has_engagement(&self) -> bool {
        !self.engagement.is_empty()
    }
}

/// A normalized item annotated by the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: NormalizedItem,
    pub score: f64,
    /// 1-based position within the source's ranked list
    pub rank: usize,
}

impl ScoredItem {
    pub fn identity_key(&self) -> &str {
        &self.item.identity_key
    }
}
