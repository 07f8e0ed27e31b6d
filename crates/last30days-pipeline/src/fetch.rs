//! Fetch orchestration
//!
//! One task per requested source, joined at a single barrier. A failing or
//! panicking task only ever becomes that source's error value. After the
//! barrier a thin Reddit result may get one broadened retry, and then every
//! Reddit hit is enriched one at a time.

use crate::config::DEFAULT_RETRY_THRESHOLD;
use crate::error::PipelineError;
use crate::normalize::identity_key;
use last30days_provider::{SearchCapability, ThreadEnricher};
use last30days_types::{ModelsUsed, RawItem, ResearchQuery, Source, SourceMode};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Leading phrases that frame a question rather than name a subject
const LEADING_PHRASES: &[&[&str]] = &[
    &["how", "to"],
    &["how", "do", "i"],
    &["what", "is"],
    &["what", "are"],
    &["the", "best"],
    &["best"],
    &["top"],
    &["latest"],
];

/// Words that qualify a topic without changing what it is about
const QUALIFIERS: &[&str] = &[
    "tips",
    "tricks",
    "guide",
    "guides",
    "tutorial",
    "tutorials",
    "news",
    "update",
    "updates",
    "recommendations",
    "review",
    "reviews",
    "reddit",
    "twitter",
    "x",
];

type SearchResult = last30days_provider::Result<Vec<RawItem>>;

/// Raw per-source results plus the non-fatal problems met on the way
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub reddit: Vec<RawItem>,
    pub x: Vec<RawItem>,
    pub reddit_error: Option<PipelineError>,
    pub x_error: Option<PipelineError>,
    pub warnings: Vec<String>,
    /// The mode asks the caller for generic web coverage
    pub web_search_needed: bool,
}

/// Dispatches the search capabilities for a query
pub struct FetchOrchestrator {
    reddit: Option<Arc<dyn SearchCapability>>,
    x: Option<Arc<dyn SearchCapability>>,
    enricher: Arc<dyn ThreadEnricher>,
    retry_threshold: usize,
}

impl FetchOrchestrator {
    /// Orchestrator with no search capabilities yet
    pub fn new(enricher: Arc<dyn ThreadEnricher>) -> Self {
        Self {
            reddit: None,
            x: None,
            enricher,
            retry_threshold: DEFAULT_RETRY_THRESHOLD,
        }
    }

    pub fn with_reddit(mut self, search: Arc<dyn SearchCapability>) -> Self {
        self.reddit = Some(search);
        self
    }

    pub fn with_x(mut self, search: Arc<dyn SearchCapability>) -> Self {
        self.x = Some(search);
        self
    }

    pub fn with_retry_threshold(mut self, threshold: usize) -> Self {
        self.retry_threshold = threshold;
        self
    }

    /// Models targeted by the capabilities `mode` would dispatch
    pub fn models_used(&self, mode: SourceMode) -> ModelsUsed {
        let model = |wanted: bool, search: &Option<Arc<dyn SearchCapability>>| {
            search
                .as_ref()
                .filter(|_| wanted)
                .map(|s| s.model().to_string())
        };
        ModelsUsed {
            reddit: model(mode.wants_reddit(), &self.reddit),
            x: model(mode.wants_x(), &self.x),
        }
    }

    pub async fn fetch(&self, query: &ResearchQuery) -> FetchOutcome {
        let mode = query.source_mode;
        let mut outcome = FetchOutcome {
            web_search_needed: mode.wants_web(),
            ..FetchOutcome::default()
        };

        if mode.sources().is_empty() {
            info!(%mode, "Web-only mode, no source searches dispatched");
            return outcome;
        }

        info!(topic = %query.topic, %mode, depth = %query.depth, "Dispatching source searches");
        let reddit_task = self.dispatch(Source::Reddit, mode.wants_reddit(), query);
        let x_task = self.dispatch(Source::X, mode.wants_x(), query);
        let (reddit, x) = tokio::join!(reddit_task.settle(), x_task.settle());

        match reddit {
            Some(Ok(mut items)) => {
                if items.len() < self.retry_threshold {
                    self.broaden(query, &mut items).await;
                }
                outcome.warnings.extend(self.enrich_all(query, &mut items).await);
                outcome.reddit = items;
            }
            Some(Err(e)) => {
                warn!("Reddit fetch failed: {}", e);
                outcome.reddit_error = Some(e);
            }
            None => {}
        }

        match x {
            Some(Ok(items)) => outcome.x = items,
            Some(Err(e)) => {
                warn!("X fetch failed: {}", e);
                outcome.x_error = Some(e);
            }
            None => {}
        }

        info!(
            reddit = outcome.reddit.len(),
            x = outcome.x.len(),
            warnings = outcome.warnings.len(),
            "Fetch complete"
        );
        outcome
    }

    fn capability(&self, source: Source) -> Option<&Arc<dyn SearchCapability>> {
        match source {
            Source::Reddit => self.reddit.as_ref(),
            Source::X => self.x.as_ref(),
        }
    }

    fn dispatch(&self, source: Source, wanted: bool, query: &ResearchQuery) -> Branch {
        if !wanted {
            return Branch::Skipped;
        }
        let Some(search) = self.capability(source) else {
            return Branch::Unavailable(source);
        };
        let search = Arc::clone(search);
        let query = query.clone();
        Branch::Running(
            source,
            tokio::spawn(async move { search.search(&query).await }),
        )
    }

    /// One extra Reddit search on the query's core subject. Its errors are
    /// logged and dropped.
    async fn broaden(&self, query: &ResearchQuery, items: &mut Vec<RawItem>) {
        let Some(search) = self.reddit.as_ref() else {
            return;
        };
        let core = core_subject(&query.topic);
        let topic = query.topic.split_whitespace().collect::<Vec<_>>().join(" ");
        if core.eq_ignore_ascii_case(&topic) {
            debug!(topic = %query.topic, count = items.len(), "Few Reddit hits, topic already minimal");
            return;
        }

        info!(topic = %query.topic, %core, count = items.len(), "Few Reddit hits, retrying with core subject");
        let extra = match search.search(&query.with_topic(core)).await {
            Ok(extra) => extra,
            Err(e) => {
                debug!("Broadened Reddit search failed, ignoring: {}", e);
                return;
            }
        };

        let mut seen: HashSet<String> = items
            .iter()
            .filter_map(|i| i.url().and_then(identity_key))
            .collect();
        let before = items.len();
        for item in extra {
            if let Some(key) = item.url().and_then(identity_key) {
                if seen.insert(key) {
                    items.push(item);
                }
            }
        }
        debug!(added = items.len() - before, "Merged broadened Reddit hits");
    }

    /// Enrich each Reddit hit in turn; failures keep the bare hit and
    /// come back as warnings.
    async fn enrich_all(&self, query: &ResearchQuery, items: &mut [RawItem]) -> Vec<String> {
        let timeout = Duration::from_secs(query.depth.profile().enrich_timeout_secs);
        let mut warnings = Vec::new();
        for item in items.iter_mut() {
            let RawItem::Reddit(thread) = item else {
                continue;
            };
            let Some(url) = thread.url.clone() else {
                continue;
            };
            match self.enricher.enrich(&url, timeout).await {
                Ok(detail) => thread.enrichment = Some(detail),
                Err(e) => {
                    warn!(%url, "Enrichment failed: {}", e);
                    warnings.push(format!("enrichment failed for {url}: {e}"));
                }
            }
        }
        warnings
    }
}

/// A source search in flight, or the reason there is none
enum Branch {
    Skipped,
    Unavailable(Source),
    Running(Source, JoinHandle<SearchResult>),
}

impl Branch {
    async fn settle(self) -> Option<Result<Vec<RawItem>, PipelineError>> {
        match self {
            Branch::Skipped => None,
            Branch::Unavailable(source) => Some(Err(PipelineError::NotConfigured(source))),
            Branch::Running(origin, handle) => Some(match handle.await {
                Ok(Ok(items)) => Ok(items),
                Ok(Err(e)) => Err(PipelineError::Source {
                    origin,
                    message: e.to_string(),
                }),
                Err(join_error) => {
                    debug!(%origin, "Search task ended abnormally: {}", join_error);
                    Err(PipelineError::TaskPanicked { origin })
                }
            }),
        }
    }
}

/// Strip question framing and qualifier words from a topic.
///
/// Falls back to the trimmed topic when nothing would be left.
pub fn core_subject(topic: &str) -> String {
    let lowered = topic.to_lowercase();
    let mut words: Vec<&str> = lowered.split_whitespace().collect();

    while let Some(phrase) = LEADING_PHRASES
        .iter()
        .find(|p| words.len() > p.len() && words.starts_with(p))
    {
        words.drain(..phrase.len());
    }

    let kept: Vec<&str> = words
        .into_iter()
        .filter(|w| {
            let bare = w.trim_matches(|c: char| !c.is_alphanumeric());
            !QUALIFIERS.contains(&bare) && !is_recent_year(bare)
        })
        .collect();

    if kept.is_empty() {
        topic.trim().to_string()
    } else {
        kept.join(" ")
    }
}

fn is_recent_year(word: &str) -> bool {
    word.parse::<u16>()
        .is_ok_and(|year| (2024..=2030).contains(&year))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_support::window;
    use chrono::{TimeZone, Utc};
    use async_trait::async_trait;
    use last30days_provider::mock::{MockEnricher, MockSearch};
    use last30days_types::{Depth, RedditRaw, ThreadDetail, XRaw};
    use std::collections::BTreeMap;

    /// A search whose task dies mid-flight
    struct PanickingSearch;

    #[async_trait]
    impl SearchCapability for PanickingSearch {
        fn source(&self) -> Source {
            Source::Reddit
        }

        fn model(&self) -> &str {
            "panicking-model"
        }

        async fn search(&self, _query: &ResearchQuery) -> last30days_provider::Result<Vec<RawItem>> {
            panic!("search blew up");
        }
    }

    fn query(topic: &str, mode: SourceMode) -> ResearchQuery {
        let as_of = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single().unwrap();
        ResearchQuery::new(topic, window(), Depth::Quick, mode, as_of)
    }

    fn reddit(url: &str) -> RawItem {
        RawItem::Reddit(RedditRaw {
            url: Some(url.to_string()),
            ..RedditRaw::default()
        })
    }

    fn x(url: &str) -> RawItem {
        RawItem::X(XRaw {
            url: Some(url.to_string()),
            ..XRaw::default()
        })
    }

    fn no_threads() -> Arc<MockEnricher> {
        Arc::new(MockEnricher::default())
    }

    #[test]
    fn test_core_subject() {
        assert_eq!(core_subject("Best Rust web frameworks 2026"), "rust web frameworks");
        assert_eq!(core_subject("how to learn rust tips"), "learn rust");
        assert_eq!(core_subject("rust async runtimes"), "rust async runtimes");
        assert_eq!(core_subject("  news  "), "news");
        assert_eq!(core_subject("top"), "top");
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_the_other() {
        let orchestrator = FetchOrchestrator::new(no_threads())
            .with_reddit(Arc::new(MockSearch::failing(Source::Reddit, "rate limited")))
            .with_x(Arc::new(MockSearch::with_items(
                Source::X,
                vec![x("https://x.com/a/status/1")],
            )));

        let outcome = orchestrator.fetch(&query("rust", SourceMode::Both)).await;
        assert!(matches!(
            outcome.reddit_error,
            Some(PipelineError::Source { origin: Source::Reddit, .. })
        ));
        assert!(outcome.x_error.is_none());
        assert_eq!(outcome.x.len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_search_is_isolated() {
        let orchestrator = FetchOrchestrator::new(no_threads())
            .with_reddit(Arc::new(PanickingSearch))
            .with_x(Arc::new(MockSearch::from_fixture(Source::X).unwrap()));

        let outcome = orchestrator.fetch(&query("rust", SourceMode::Both)).await;
        let reddit_error = outcome.reddit_error.expect("reddit branch fails");
        assert!(matches!(reddit_error, PipelineError::TaskPanicked { origin: Source::Reddit }));
        assert_eq!(reddit_error.to_string(), "reddit search task panicked");
        assert!(outcome.reddit.is_empty());
        assert!(outcome.x_error.is_none());
        assert!(!outcome.x.is_empty());
    }

    #[tokio::test]
    async fn test_missing_capability_is_a_source_error() {
        let orchestrator = FetchOrchestrator::new(no_threads());
        let outcome = orchestrator.fetch(&query("rust", SourceMode::X)).await;
        assert!(matches!(outcome.x_error, Some(PipelineError::NotConfigured(Source::X))));
        assert!(outcome.reddit_error.is_none());
    }

    #[tokio::test]
    async fn test_web_only_dispatches_nothing() {
        let reddit_search = Arc::new(MockSearch::with_items(Source::Reddit, vec![]));
        let x_search = Arc::new(MockSearch::with_items(Source::X, vec![]));
        let orchestrator = FetchOrchestrator::new(no_threads())
            .with_reddit(reddit_search.clone())
            .with_x(x_search.clone());

        let outcome = orchestrator.fetch(&query("rust", SourceMode::Web)).await;
        assert!(outcome.web_search_needed);
        assert!(outcome.reddit_error.is_none() && outcome.x_error.is_none());
        assert!(reddit_search.calls().is_empty());
        assert!(x_search.calls().is_empty());
    }

    #[tokio::test]
    async fn test_thin_reddit_result_is_broadened_and_merged() {
        let search = Arc::new(
            MockSearch::with_items(Source::Reddit, vec![])
                .with_topic(
                    "best rust gui toolkits 2026",
                    vec![reddit("https://www.reddit.com/r/rust/comments/1/egui/")],
                )
                .with_topic(
                    "rust gui toolkits",
                    vec![
                        reddit("https://old.reddit.com/r/rust/comments/1/egui?utm_source=x"),
                        reddit("https://reddit.com/r/rust/comments/2/iced"),
                    ],
                ),
        );
        let orchestrator = FetchOrchestrator::new(no_threads()).with_reddit(search.clone());

        let outcome = orchestrator
            .fetch(&query("best rust gui toolkits 2026", SourceMode::Reddit))
            .await;
        assert_eq!(search.calls(), vec!["best rust gui toolkits 2026", "rust gui toolkits"]);
        assert_eq!(outcome.reddit.len(), 2);
    }

    #[tokio::test]
    async fn test_broadened_retry_errors_are_swallowed() {
        let search = Arc::new(
            MockSearch::with_items(Source::Reddit, vec![reddit("https://reddit.com/r/a/comments/1")])
                .failing_on("rust", "boom"),
        );
        let orchestrator = FetchOrchestrator::new(no_threads()).with_reddit(search.clone());

        let outcome = orchestrator.fetch(&query("rust news", SourceMode::Reddit)).await;
        assert_eq!(search.calls().len(), 2);
        assert!(outcome.reddit_error.is_none());
        assert_eq!(outcome.reddit.len(), 1);
    }

    #[tokio::test]
    async fn test_no_retry_when_topic_is_already_minimal() {
        let search = Arc::new(MockSearch::with_items(Source::Reddit, vec![]));
        let orchestrator = FetchOrchestrator::new(no_threads()).with_reddit(search.clone());

        orchestrator.fetch(&query("  Rust   async ", SourceMode::Reddit)).await;
        assert_eq!(search.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_no_retry_at_threshold() {
        let items = (0..5)
            .map(|i| reddit(&format!("https://reddit.com/r/a/comments/{i}")))
            .collect();
        let search = Arc::new(MockSearch::with_items(Source::Reddit, items));
        let orchestrator = FetchOrchestrator::new(no_threads())
            .with_reddit(search.clone())
            .with_retry_threshold(5);

        orchestrator.fetch(&query("rust news", SourceMode::Reddit)).await;
        assert_eq!(search.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_enrichment_failures_become_warnings() {
        let mut threads = BTreeMap::new();
        threads.insert(
            "https://reddit.com/r/a/comments/1".to_string(),
            ThreadDetail {
                score: Some(42),
                ..ThreadDetail::default()
            },
        );
        let enricher = Arc::new(MockEnricher::with_threads(threads));
        let search = Arc::new(MockSearch::with_items(
            Source::Reddit,
            vec![
                reddit("https://reddit.com/r/a/comments/1/"),
                reddit("https://reddit.com/r/a/comments/2"),
                RawItem::Reddit(RedditRaw::default()),
            ],
        ));
        let orchestrator = FetchOrchestrator::new(enricher.clone())
            .with_reddit(search)
            .with_retry_threshold(0);

        let outcome = orchestrator.fetch(&query("rust", SourceMode::Reddit)).await;
        assert_eq!(enricher.calls().len(), 2);
        assert_eq!(outcome.reddit.len(), 3);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("comments/2"));
        match &outcome.reddit[0] {
            RawItem::Reddit(r) => assert_eq!(r.enrichment.as_ref().and_then(|d| d.score), Some(42)),
            other => panic!("unexpected item {other:?}"),
        }
    }

    #[test]
    fn test_models_used_follows_mode() {
        let orchestrator = FetchOrchestrator::new(no_threads())
            .with_reddit(Arc::new(MockSearch::with_items(Source::Reddit, vec![])))
            .with_x(Arc::new(MockSearch::with_items(Source::X, vec![])));
        let models = orchestrator.models_used(SourceMode::Reddit);
        assert_eq!(models.reddit.as_deref(), Some("mock-reddit-model"));
        assert_eq!(models.x, None);
    }
}
