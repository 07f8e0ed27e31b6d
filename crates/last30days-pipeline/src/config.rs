//! Tunable pipeline policy
//!
//! The retry threshold and scoring weights are policy values, not contract.

use serde::Deserialize;

/// Reddit hit count below which a broadened retry is attempted
pub const DEFAULT_RETRY_THRESHOLD: usize = 5;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub relevance_weight: f64,
    pub recency_weight: f64,
    pub engagement_weight: f64,
    /// Subtracted when an item carries no engagement signal at all
    pub unknown_engagement_penalty: f64,
    /// Raw engagement at which the engagement component reaches 0.5
    pub engagement_half_saturation: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            relevance_weight: 0.45,
            recency_weight: 0.25,
            engagement_weight: 0.30,
            unknown_engagement_penalty: 3.0,
            engagement_half_saturation: 5.0,
        }
    }
}

/// Bounds for the context snippet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContextLimits {
    /// Items listed per source
    pub top_n: usize,
    /// Hard cap on the snippet length in characters
    pub max_chars: usize,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            top_n: 5,
            max_chars: 4000,
        }
    }
}

/// Everything the pipeline needs besides its collaborators
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub retry_threshold: usize,
    pub scoring: ScoringPolicy,
    pub context: ContextLimits,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            retry_threshold: DEFAULT_RETRY_THRESHOLD,
            scoring: ScoringPolicy::default(),
            context: ContextLimits::default(),
        }
    }
}
