use crate::args::{Args, Emit};
use crate::config::{resolve_mode, Availability, Config};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use last30days_persistence::ContextStore;
use last30days_pipeline::{
    render_compact, render_json, render_markdown, trailing_window, FetchOrchestrator,
    ResearchPipeline,
};
use last30days_provider::mock::{mock_now, MockEnricher, MockSearch};
use last30days_provider::{
    ModelSelector, RedditSearch, RedditThreadEnricher, SearchCapability, SearchClientConfig,
    ThreadEnricher, XSearch,
};
use last30days_types::{Report, ResearchQuery, Source, SourceMode};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// One research run from parsed arguments to printed output
pub struct ResearchService {
    config: Config,
    args: Args,
}

impl ResearchService {
    pub fn new(config: Config, args: Args) -> Self {
        Self { config, args }
    }

    /// Resolve the source mode before any network I/O.
    ///
    /// Fails when an explicitly requested source has no credentials.
    pub fn source_mode(&self) -> Result<SourceMode> {
        let availability = if self.args.mock {
            Availability::all()
        } else {
            self.config.availability()
        };
        Ok(resolve_mode(
            self.args.sources,
            self.args.include_web,
            &availability,
        )?)
    }

    pub async fn run(self, mode: SourceMode) -> Result<()> {
        let now = if self.args.mock { mock_now() } else { Utc::now() };
        let days = self.args.days.unwrap_or(self.config.research.days);
        let query = ResearchQuery::new(
            self.args.topic(),
            trailing_window(now, days),
            self.args.depth(),
            mode,
            now,
        );
        info!(
            topic = %query.topic,
            from = %query.from,
            to = %query.to,
            %mode,
            depth = %query.depth,
            mock = self.args.mock,
            "Starting research"
        );

        let pipeline = ResearchPipeline::new(
            self.fetcher(mode).await?,
            self.config.pipeline_config(),
        );
        let report = pipeline.run(&query).await;

        let persisted = self.persist(&report);
        let output = match self.args.emit {
            Emit::Compact => render_compact(&report),
            Emit::Json => render_json(&report),
            Emit::Md => render_markdown(&report),
            Emit::Context => report.context_snippet.clone(),
            Emit::Path => match persisted {
                Some(path) => path.display().to_string(),
                None => bail!("context snippet could not be persisted"),
            },
        };
        println!("{}", output.trim_end());
        Ok(())
    }

    async fn fetcher(&self, mode: SourceMode) -> Result<FetchOrchestrator> {
        let enricher: Arc<dyn ThreadEnricher> = if self.args.mock {
            Arc::new(MockEnricher::from_fixture()?)
        } else {
            Arc::new(RedditThreadEnricher::new())
        };

        let mut fetcher = FetchOrchestrator::new(enricher);
        let selector = ModelSelector::new();
        for source in mode.sources() {
            let search = self
                .search(source, &selector)
                .await
                .with_context(|| format!("Failed to set up {} search", source.label()))?;
            fetcher = match source {
                Source::Reddit => fetcher.with_reddit(search),
                Source::X => fetcher.with_x(search),
            };
        }
        Ok(fetcher)
    }

    async fn search(
        &self,
        source: Source,
        selector: &ModelSelector,
    ) -> Result<Arc<dyn SearchCapability>> {
        if self.args.mock {
            return Ok(Arc::new(MockSearch::from_fixture(source)?));
        }

        let provider = self.config.provider(source);
        let base_url = self.config.base_url(source);
        let model = selector
            .select(source, provider.model(), &provider.api_key, base_url)
            .await;
        let client_config = SearchClientConfig::new(provider.api_key.clone(), base_url, model);
        let search: Arc<dyn SearchCapability> = match source {
            Source::Reddit => Arc::new(RedditSearch::new(client_config)?),
            Source::X => Arc::new(XSearch::new(client_config)?),
        };
        Ok(search)
    }

    /// Write the snippet (and the JSON dump) to the well-known location.
    /// Failures are logged; only `--emit path` treats them as fatal.
    fn persist(&self, report: &Report) -> Option<PathBuf> {
        let store = match ContextStore::default_location() {
            Ok(store) => store,
            Err(e) => {
                warn!("Not persisting output: {}", e);
                return None;
            }
        };
        if let Err(e) = store.save_report_json(&render_json(report)) {
            warn!("Failed to save report JSON: {}", e);
        }
        store
            .save_context(&report.context_snippet)
            .map_err(|e| warn!("Failed to save context snippet: {}", e))
            .ok()
    }
}
