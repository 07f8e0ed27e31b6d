//! Source-shaped payloads returned by the search capabilities

use crate::lenient;
use crate::Source;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A raw hit as returned by one source's search capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RawItem {
    Reddit(RedditRaw),
    X(XRaw),
}

impl RawItem {
    pub fn source(&self) -> Source {
        match self {
            RawItem::Reddit(_) => Source::Reddit,
            RawItem::X(_) => Source::X,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            RawItem::Reddit(r) => r.url.as_deref(),
            RawItem::X(x) => x.url.as_deref(),
        }
    }
}

/// A Reddit thread as described by the search model. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedditRaw {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub subreddit: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub author: Option<String>,
    /// ISO date, epoch seconds or a relative phrase, as the model reported it
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub why_relevant: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub relevance: Option<f64>,
    /// Upvotes
    #[serde(default, deserialize_with = "lenient::count")]
    pub score: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub num_comments: Option<u64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub upvote_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub selftext: Option<String>,
    /// Thread detail attached by the enrichment pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<ThreadDetail>,
    /// Fields the model returned that have no typed slot
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// An X post as described by the search model. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XRaw {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub author_handle: Option<String>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub why_relevant: Option<String>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub relevance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub likes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub reposts: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub replies: Option<u64>,
    #[serde(default, deserialize_with = "lenient::count")]
    pub quotes: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Full-thread detail fetched for a Reddit hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadDetail {
    #[serde(default)]
    pub score: Option<u64>,
    #[serde(default)]
    pub num_comments: Option<u64>,
    #[serde(default)]
    pub upvote_ratio: Option<f64>,
    /// Submission creation time, epoch seconds
    #[serde(default)]
    pub created_utc: Option<f64>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub selftext: Option<String>,
    #[serde(default)]
    pub top_comments: Vec<ThreadComment>,
    /// Substantive comment excerpts worth quoting
    #[serde(default)]
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadComment {
    pub score: i64,
    pub author: String,
    pub excerpt: String,
    #[serde(default)]
    pub url: Option<String>,
}
