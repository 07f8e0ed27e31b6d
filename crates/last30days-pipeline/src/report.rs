//! Report assembly and the end-to-end research run

use crate::config::{ContextLimits, PipelineConfig};
use crate::dedupe::dedupe;
use crate::fetch::FetchOrchestrator;
use crate::filter::filter_by_window;
use crate::normalize::normalize;
use crate::render::render_context_snippet_with;
use crate::score::score_items;
use crate::websearch::web_search_directive;
use last30days_types::{
    DateWindow, ModelsUsed, RawItem, Report, ResearchQuery, ScoredItem, Source, UpstreamPayloads,
};
use tracing::{debug, info};

/// Everything a [`Report`] is built from
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub query: ResearchQuery,
    pub models_used: ModelsUsed,
    pub reddit: Vec<ScoredItem>,
    pub x: Vec<ScoredItem>,
    pub reddit_error: Option<String>,
    pub x_error: Option<String>,
    pub warnings: Vec<String>,
    pub upstream: UpstreamPayloads,
}

/// Compose the report and render its context snippet
pub fn assemble_report(input: ReportInput, limits: &ContextLimits) -> Report {
    let web_search = web_search_directive(&input.query);
    let mut report = Report {
        topic: input.query.topic,
        from: input.query.from,
        to: input.query.to,
        mode: input.query.source_mode,
        depth: input.query.depth,
        models_used: input.models_used,
        reddit: input.reddit,
        x: input.x,
        reddit_error: input.reddit_error,
        x_error: input.x_error,
        warnings: input.warnings,
        web_search,
        context_snippet: String::new(),
        upstream: input.upstream,
    };
    report.context_snippet = render_context_snippet_with(&report, limits);
    report
}

/// normalize → hard date filter → score → dedupe, for one source
pub fn rank_source(
    raw: &[RawItem],
    source: Source,
    query: &ResearchQuery,
    config: &PipelineConfig,
) -> Vec<ScoredItem> {
    let window: DateWindow = query.window();
    let normalized = normalize(raw, source, query.as_of);
    let normalized_count = normalized.len();
    let in_window = filter_by_window(normalized, &window);
    let ranked = dedupe(score_items(in_window, &window, &config.scoring));
    debug!(
        %source,
        raw = raw.len(),
        normalized = normalized_count,
        ranked = ranked.len(),
        "Ranked source"
    );
    ranked
}

/// Fetches, ranks and assembles one report per query
pub struct ResearchPipeline {
    fetcher: FetchOrchestrator,
    config: PipelineConfig,
}

impl ResearchPipeline {
    pub fn new(fetcher: FetchOrchestrator, config: PipelineConfig) -> Self {
        let fetcher = fetcher.with_retry_threshold(config.retry_threshold);
        Self { fetcher, config }
    }

    /// Run one query. Source failures end up on the report, never as `Err`.
    pub async fn run(&self, query: &ResearchQuery) -> Report {
        let outcome = self.fetcher.fetch(query).await;

        let reddit = rank_source(&outcome.reddit, Source::Reddit, query, &self.config);
        let x = rank_source(&outcome.x, Source::X, query, &self.config);

        let report = assemble_report(
            ReportInput {
                query: query.clone(),
                models_used: self.fetcher.models_used(query.source_mode),
                reddit,
                x,
                reddit_error: outcome.reddit_error.map(|e| e.to_string()),
                x_error: outcome.x_error.map(|e| e.to_string()),
                warnings: outcome.warnings,
                upstream: UpstreamPayloads {
                    reddit: outcome.reddit,
                    x: outcome.x,
                },
            },
            &self.config.context,
        );

        info!(
            topic = %report.topic,
            reddit = report.reddit.len(),
            x = report.x.len(),
            reddit_error = report.reddit_error.is_some(),
            x_error = report.x_error.is_some(),
            "Report assembled"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{scored, window};
    use chrono::Utc;
    use last30days_types::{Depth, SourceMode};

    #[test]
    fn test_assembly_keeps_errors_independent() {
        let query = ResearchQuery::new("rust", window(), Depth::Default, SourceMode::All, Utc::now());
        let report = assemble_report(
            ReportInput {
                query,
                models_used: ModelsUsed::default(),
                reddit: Vec::new(),
                x: vec![scored("https://x.com/a/status/1", 40.0, "post")],
                reddit_error: Some("reddit search failed: 503".into()),
                x_error: None,
                warnings: Vec::new(),
                upstream: UpstreamPayloads::default(),
            },
            &ContextLimits::default(),
        );
        assert_eq!(report.x.len(), 1);
        assert!(report.reddit_error.is_some());
        assert!(report.x_error.is_none());
        assert!(report.web_search.is_some());
        assert!(report.context_snippet.contains("## last30days: rust"));
    }
}
