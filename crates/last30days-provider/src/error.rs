//! Error types for search, enrichment and model selection

use last30days_types::Source;
use thiserror::Error;

/// Provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level error (connection, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from an upstream API
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Error from the LLM client
    #[error("LLM error: {0}")]
    Llm(#[from] async_openai::error::OpenAIError),

    /// The model answered but the payload could not be read
    #[error("Parse error: {0}")]
    Parse(String),

    /// No API key configured for the source
    #[error("No credentials configured for {0}")]
    MissingCredential(Source),

    /// Mock fixture missing or malformed
    #[error("Fixture error: {0}")]
    Fixture(String),

    /// Enrichment or search exceeded its deadline
    #[error("Timed out after {0}s")]
    Timeout(u64),
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(err.to_string())
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, ProviderError>;
