//! Model selection for the search capabilities
//!
//! Precedence: explicitly configured model, then the first preferred model the
//! provider lists as available, then a built-in default.

use crate::error::{ProviderError, Result};
use last30days_types::Source;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Reddit search needs a model with built-in web search
const REDDIT_PREFERENCES: &[&str] = &[
    "gpt-4o-search-preview",
    "gpt-4o-mini-search-preview",
];

const X_PREFERENCES: &[&str] = &["grok-4", "grok-4-fast", "grok-3", "grok-3-mini"];

const LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fixture model identifiers reported in `--mock` runs
pub const MOCK_REDDIT_MODEL: &str = "mock-reddit-model";
/// Fixture model identifier for X in `--mock` runs
pub const MOCK_X_MODEL: &str = "mock-x-model";

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Resolves which model each search capability targets
#[derive(Clone, Debug, Default)]
pub struct ModelSelector {
    http: reqwest::Client,
}

impl ModelSelector {
    /// Selector with a fresh HTTP client
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in fallback for a source
    pub fn default_model(source: Source) -> &'static str {
        preferences(source)[0]
    }

    /// Fixture identifier for a source in mock runs
    pub fn mock_model(source: Source) -> &'static str {
        match source {
            Source::Reddit => MOCK_REDDIT_MODEL,
            Source::X => MOCK_X_MODEL,
        }
    }

    /// Resolve the model for `source`.
    ///
    /// Listing failures are logged and fall through to the default.
    pub async fn select(
        &self,
        source: Source,
        configured: Option<&str>,
        api_key: &str,
        base_url: &str,
    ) -> String {
        if let Some(model) = configured.map(str::trim).filter(|m| !m.is_empty()) {
            debug!(%source, %model, "Using configured model");
            return model.to_string();
        }

        match self.list_models(api_key, base_url).await {
            Ok(available) => {
                if let Some(model) = pick_preferred(&available, preferences(source)) {
                    info!(%source, %model, "Selected model from provider list");
                    return model;
                }
                debug!(%source, count = available.len(), "No preferred model listed");
            }
            Err(e) => warn!(%source, "Model listing failed, using default: {}", e),
        }

        Self::default_model(source).to_string()
    }

    async fn list_models(&self, api_key: &str, base_url: &str) -> Result<Vec<String>> {
        let url = format!("{}/models", base_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .timeout(LIST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let list: ModelList = response.json().await?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

fn preferences(source: Source) -> &'static [&'static str] {
    match source {
        Source::Reddit => REDDIT_PREFERENCES,
        Source::X => X_PREFERENCES,
    }
}

/// First preference that the provider lists
fn pick_preferred(available: &[String], preferences: &[&str]) -> Option<String> {
    preferences
        .iter()
        .find(|pref| available.iter().any(|m| m == *pref))
        .map(|pref| (*pref).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_preferred_respects_order() {
        let available = vec!["grok-3".to_string(), "grok-4".to_string(), "other".to_string()];
        assert_eq!(pick_preferred(&available, X_PREFERENCES), Some("grok-4".to_string()));
        assert_eq!(pick_preferred(&available, REDDIT_PREFERENCES), None);
    }

    #[test]
    fn test_configured_model_wins_without_network() {
        let selector = ModelSelector::new();
        let model = tokio_test::block_on(selector.select(
            Source::Reddit,
            Some(" gpt-custom "),
            "key",
            "http://127.0.0.1:9",
        ));
        assert_eq!(model, "gpt-custom");
    }

    #[tokio::test]
    async fn test_unreachable_listing_falls_back_to_default() {
        let selector = ModelSelector::new();
        let model = selector
            .select(Source::X, None, "key", "http://127.0.0.1:9")
            .await;
        assert_eq!(model, ModelSelector::default_model(Source::X));
    }

    #[test]
    fn test_mock_models_are_fixed() {
        assert_eq!(ModelSelector::mock_model(Source::Reddit), MOCK_REDDIT_MODEL);
        assert_eq!(ModelSelector::mock_model(Source::X), MOCK_X_MODEL);
    }
}
