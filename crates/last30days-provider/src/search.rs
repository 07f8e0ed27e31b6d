//! LLM-backed search capabilities for Reddit and X

use crate::error::{ProviderError, Result};
use crate::parse::parse_items;
use crate::prompts::{search_prompt, SYSTEM_PROMPT};
use crate::SearchCapability;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use last30days_types::{RawItem, ResearchQuery, Source};
use tracing::{debug, info, warn};

/// Default OpenAI API base
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default xAI API base (OpenAI-compatible)
pub const XAI_BASE_URL: &str = "https://api.x.ai/v1";

/// Connection settings for one search capability
#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    /// API key for the provider
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Model to query
    pub model: String,
}

impl SearchClientConfig {
    /// Settings with the given key and model against `base_url`
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

/// Shared chat-completion plumbing for both sources
struct LlmSearchClient {
    source: Source,
    model: String,
    client: Client<OpenAIConfig>,
}

impl LlmSearchClient {
    fn new(source: Source, config: SearchClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingCredential(source));
        }
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.api_key)
            .with_api_base(config.base_url);
        info!(%source, model = %config.model, "Search client initialized");
        Ok(Self {
            source,
            model: config.model,
            client: Client::with_config(openai_config),
        })
    }

    async fn search(&self, query: &ResearchQuery) -> Result<Vec<RawItem>> {
        let prompt = search_prompt(self.source, query);

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()?;

        debug!(source = %self.source, model = %self.model, topic = %query.topic, "Sending search request");
        let response = self.client.chat().create(request).await?;

        let Some(content) = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
        else {
            warn!(source = %self.source, "Model returned no content");
            return Ok(Vec::new());
        };

        let items = parse_items(self.source, &content)?;
        info!(source = %self.source, count = items.len(), "Search returned items");
        Ok(items)
    }
}

/// Reddit search through an OpenAI search-capable model
pub struct RedditSearch {
    inner: LlmSearchClient,
}

impl RedditSearch {
    /// Build the client; fails if no API key is configured
    pub fn new(config: SearchClientConfig) -> Result<Self> {
        Ok(Self {
            inner: LlmSearchClient::new(Source::Reddit, config)?,
        })
    }
}

#[async_trait]
impl SearchCapability for RedditSearch {
    fn source(&self) -> Source {
        Source::Reddit
    }

    fn model(&self) -> &str {
        &self.inner.model
    }

    async fn search(&self, query: &ResearchQuery) -> Result<Vec<RawItem>> {
        self.inner.search(query).await
    }
}

/// X search through xAI's OpenAI-compatible endpoint
pub struct XSearch {
    inner: LlmSearchClient,
}

impl XSearch {
    /// Build the client; fails if no API key is configured
    pub fn new(config: SearchClientConfig) -> Result<Self> {
        Ok(Self {
            inner: LlmSearchClient::new(Source::X, config)?,
        })
    }
}

#[async_trait]
impl SearchCapability for XSearch {
    fn source(&self) -> Source {
        Source::X
    }

    fn model(&self) -> &str {
        &self.inner.model
    }

    async fn search(&self, query: &ResearchQuery) -> Result<Vec<RawItem>> {
        self.inner.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_rejected() {
        let result = RedditSearch::new(SearchClientConfig::new("  ", OPENAI_BASE_URL, "m"));
        assert!(matches!(
            result,
            Err(ProviderError::MissingCredential(Source::Reddit))
        ));
    }

    #[test]
    fn test_client_reports_model() {
        let search = XSearch::new(SearchClientConfig::new("key", XAI_BASE_URL, "grok-4"));
        assert!(matches!(search, Ok(ref s) if s.model() == "grok-4" && s.source() == Source::X));
    }
}
