use last30days_types::Source;
use thiserror::Error;

/// Per-source failures captured at the orchestrator boundary
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{origin} search failed: {message}")]
    Source { origin: Source, message: String },

    #[error("{origin} search task panicked")]
    TaskPanicked { origin: Source },

    #[error("no {0} search capability configured")]
    NotConfigured(Source),
}
