//! Fixture-backed search and enrichment for `--mock` runs and tests
//!
//! Fixtures are embedded at compile time so mock runs never touch the
//! network or the filesystem and produce identical output every time.

use crate::error::{ProviderError, Result};
use crate::models::ModelSelector;
use crate::parse::parse_items;
use crate::{SearchCapability, ThreadEnricher};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use last30days_types::{RawItem, ResearchQuery, Source, ThreadDetail};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

const REDDIT_FIXTURE: &str = include_str!("../fixtures/reddit_search.json");
const X_FIXTURE: &str = include_str!("../fixtures/x_search.json");
const THREADS_FIXTURE: &str = include_str!("../fixtures/reddit_threads.json");

/// Fixed clock for mock runs; the fixtures are dated relative to it
pub fn mock_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Canned search responses, optionally keyed by topic
pub struct MockSearch {
    source: Source,
    model: String,
    items: Vec<RawItem>,
    by_topic: HashMap<String, Vec<RawItem>>,
    failure: Option<String>,
    failing_topics: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockSearch {
    /// Search returning `items` for every topic
    pub fn with_items(source: Source, items: Vec<RawItem>) -> Self {
        Self {
            source,
            model: ModelSelector::mock_model(source).to_string(),
            items,
            by_topic: HashMap::new(),
            failure: None,
            failing_topics: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Search returning the embedded fixture for `source`
    pub fn from_fixture(source: Source) -> Result<Self> {
        let text = match source {
            Source::Reddit => REDDIT_FIXTURE,
            Source::X => X_FIXTURE,
        };
        let items = parse_items(source, text)
            .map_err(|e| ProviderError::Fixture(format!("{source} fixture: {e}")))?;
        Ok(Self::with_items(source, items))
    }

    /// Search that always fails with `message`
    pub fn failing(source: Source, message: impl Into<String>) -> Self {
        let mut mock = Self::with_items(source, Vec::new());
        mock.failure = Some(message.into());
        mock
    }

    /// Return `items` when asked about exactly `topic`
    pub fn with_topic(mut self, topic: impl Into<String>, items: Vec<RawItem>) -> Self {
        self.by_topic.insert(topic.into(), items);
        self
    }

    /// Fail with `message` when asked about exactly `topic`
    pub fn failing_on(mut self, topic: impl Into<String>, message: impl Into<String>) -> Self {
        self.failing_topics.insert(topic.into(), message.into());
        self
    }

    /// Topics searched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchCapability for MockSearch {
    fn source(&self) -> Source {
        self.source
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn search(&self, query: &ResearchQuery) -> Result<Vec<RawItem>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(query.topic.clone());
        }
        debug!(source = %self.source, topic = %query.topic, "Mock search");

        if let Some(message) = self
            .failure
            .as_ref()
            .or_else(|| self.failing_topics.get(&query.topic))
        {
            return Err(ProviderError::Api {
                status: 503,
                message: message.clone(),
            });
        }

        Ok(self
            .by_topic
            .get(&query.topic)
            .unwrap_or(&self.items)
            .clone())
    }
}

/// Thread details served from a URL-keyed map
#[derive(Debug, Default)]
pub struct MockEnricher {
    threads: BTreeMap<String, ThreadDetail>,
    calls: Mutex<Vec<String>>,
}

impl MockEnricher {
    /// Enricher serving the embedded thread fixture
    pub fn from_fixture() -> Result<Self> {
        let threads: BTreeMap<String, ThreadDetail> = serde_json::from_str(THREADS_FIXTURE)
            .map_err(|e| ProviderError::Fixture(format!("thread fixture: {e}")))?;
        Ok(Self::with_threads(threads))
    }

    /// Enricher serving `threads`, keyed by URL without query or trailing slash
    pub fn with_threads(threads: BTreeMap<String, ThreadDetail>) -> Self {
        Self {
            threads,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// URLs enriched so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ThreadEnricher for MockEnricher {
    async fn enrich(&self, url: &str, _timeout: Duration) -> Result<ThreadDetail> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        let key = url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        self.threads.get(key).cloned().ok_or_else(|| ProviderError::Api {
            status: 404,
            message: format!("no fixture thread for {key}"),
        })
    }
}
