//! last30days Pipeline - From a topic to a ranked, rendered report
//!
//! Stages, in order:
//! - [`fetch`]: concurrent source searches, broadened retry, enrichment
//! - [`normalize`]: source-shaped hits into [`NormalizedItem`](last30days_types::NormalizedItem)
//! - [`filter`]: the hard date filter
//! - [`score`] and [`dedupe`]: per-source ranking
//! - [`report`]: assembly, plus [`ResearchPipeline`] running it all
//! - [`render`]: compact, JSON, Markdown and context-snippet output

#![deny(unsafe_code, unused_imports, unused_variables)]

pub mod config;
pub mod dates;
pub mod dedupe;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod normalize;
pub mod render;
pub mod report;
pub mod score;
pub mod websearch;

#[cfg(test)]
mod test_support;

pub use config::{ContextLimits, PipelineConfig, ScoringPolicy, DEFAULT_RETRY_THRESHOLD};
pub use dates::{trailing_window, MAX_WINDOW_DAYS};
pub use dedupe::dedupe;
pub use error::PipelineError;
pub use fetch::{core_subject, FetchOrchestrator, FetchOutcome};
pub use filter::filter_by_window;
pub use normalize::{identity_key, normalize};
pub use render::{
    render_compact, render_context_snippet, render_context_snippet_with, render_json,
    render_markdown,
};
pub use report::{assemble_report, rank_source, ReportInput, ResearchPipeline};
pub use score::score_items;
pub use websearch::web_search_directive;
