use crate::args::SourcesArg;
use last30days_pipeline::{ContextLimits, PipelineConfig, ScoringPolicy, MAX_WINDOW_DAYS};
use last30days_provider::search::{OPENAI_BASE_URL, XAI_BASE_URL};
use last30days_types::{Source, SourceMode};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[openai]
api_key = ""  # Set via OPENAI_API_KEY env var
model = ""  # Empty: pick from the provider's model list
base_url = ""  # Optional: Set via OPENAI_BASE_URL env var

[xai]
api_key = ""  # Set via XAI_API_KEY env var
model = ""
base_url = ""  # Optional: Set via XAI_BASE_URL env var

[research]
days = 30
retry_threshold = 5  # Reddit hits below this trigger one broadened search
context_top_n = 5
context_max_chars = 4000

[scoring]
relevance_weight = 0.45
recency_weight = 0.25
engagement_weight = 0.30
unknown_engagement_penalty = 3.0

[logging]
level = "info"  # trace, debug, info, warn, error
"#;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    pub fn base_url_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(default)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ResearchConfig {
    pub days: u32,
    pub retry_threshold: usize,
    pub context_top_n: usize,
    pub context_max_chars: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        let limits = ContextLimits::default();
        Self {
            days: 30,
            retry_threshold: last30days_pipeline::DEFAULT_RETRY_THRESHOLD,
            context_top_n: limits.top_n,
            context_max_chars: limits.max_chars,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub openai: ProviderConfig,
    pub xai: ProviderConfig,
    pub research: ResearchConfig,
    pub scoring: ScoringPolicy,
    pub logging: LoggingConfig,
}

/// Sources that currently have usable credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    pub available: BTreeSet<Source>,
}

impl Availability {
    /// Every source; mock runs need no credentials
    pub fn all() -> Self {
        Self {
            available: Source::ALL.into_iter().collect(),
        }
    }

    pub fn contains(&self, source: Source) -> bool {
        self.available.contains(&source)
    }
}

/// A requested source has no usable credentials
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no credentials for {}: set {}", .missing.join(", "), .hint.join(" / "))]
pub struct MissingCredentials {
    pub missing: Vec<&'static str>,
    pub hint: Vec<&'static str>,
}

/// Resolve `--sources` (and `--include-web`) against what is usable
pub fn resolve_mode(
    requested: SourcesArg,
    include_web: bool,
    availability: &Availability,
) -> Result<SourceMode, MissingCredentials> {
    let reddit = availability.contains(Source::Reddit);
    let x = availability.contains(Source::X);

    let mode = match requested {
        SourcesArg::Auto => match (reddit, x) {
            (true, true) => SourceMode::Both,
            (true, false) => SourceMode::Reddit,
            (false, true) => SourceMode::X,
            (false, false) => {
                warn!("No source credentials configured, falling back to web-only mode");
                SourceMode::Web
            }
        },
        SourcesArg::Reddit => SourceMode::Reddit,
        SourcesArg::X => SourceMode::X,
        SourcesArg::Both => SourceMode::Both,
    };

    let missing: Vec<Source> = mode
        .sources()
        .into_iter()
        .filter(|s| !availability.contains(*s))
        .collect();
    if !missing.is_empty() {
        return Err(MissingCredentials {
            missing: missing.iter().map(|s| s.label()).collect(),
            hint: missing.iter().map(|s| credential_env(*s)).collect(),
        });
    }

    Ok(if include_web { mode.with_web() } else { mode })
}

fn credential_env(source: Source) -> &'static str {
    match source {
        Source::Reddit => "OPENAI_API_KEY",
        Source::X => "XAI_API_KEY",
    }
}

impl Config {
    /// Global config path: <config dir>/last30days/last30days.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("last30days").join("last30days.toml"))
    }

    /// Ensure the global config file exists, creating the default if needed
    fn ensure_global_config() -> anyhow::Result<Option<PathBuf>> {
        let Some(config_path) = Self::global_config_path() else {
            return Ok(None);
        };

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir)?;
            }
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())?;
            eprintln!("Created default config: {}", config_path.display());
            eprintln!("Please edit this file or set OPENAI_API_KEY / XAI_API_KEY.");
        }

        Ok(Some(config_path))
    }

    /// Load configuration with layered approach:
    /// 1. Global config: <config dir>/last30days/last30days.toml (auto-created)
    /// 2. Local override: ./last30days.toml (optional)
    /// 3. Environment variables prefixed LAST30DAYS__
    /// 4. Convenience variables such as OPENAI_API_KEY (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let mut config_builder = config::Config::builder();

        // Layer 1: Global config. Failing to create it is not fatal.
        match Self::ensure_global_config() {
            Ok(Some(path)) => {
                config_builder = config_builder.add_source(config::File::from(path).required(false));
            }
            Ok(None) => {}
            Err(e) => eprintln!("Could not create global config: {e}"),
        }

        config_builder = config_builder
            // Layer 2: Local workspace config (optional override)
            .add_source(config::File::with_name("last30days").required(false))
            // Layer 3: Environment variables with LAST30DAYS__ prefix
            .add_source(config::Environment::with_prefix("LAST30DAYS").separator("__"));

        // Layer 4: Convenience env var overrides
        for (var, key) in [
            ("OPENAI_API_KEY", "openai.api_key"),
            ("OPENAI_MODEL", "openai.model"),
            ("OPENAI_BASE_URL", "openai.base_url"),
            ("XAI_API_KEY", "xai.api_key"),
            ("XAI_MODEL", "xai.model"),
            ("XAI_BASE_URL", "xai.base_url"),
        ] {
            if let Ok(value) = env::var(var) {
                config_builder = config_builder.set_override(key, value)?;
            }
        }

        let config: Self = config_builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the command line would also reject
    fn validate(&self) -> anyhow::Result<()> {
        let days = self.research.days;
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            anyhow::bail!("research.days must be between 1 and {MAX_WINDOW_DAYS}, got {days}");
        }
        Ok(())
    }

    /// Parse a single TOML document on top of the defaults
    #[cfg(test)]
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn availability(&self) -> Availability {
        let mut available = BTreeSet::new();
        if self.openai.has_key() {
            available.insert(Source::Reddit);
        }
        if self.xai.has_key() {
            available.insert(Source::X);
        }
        Availability { available }
    }

    pub fn provider(&self, source: Source) -> &ProviderConfig {
        match source {
            Source::Reddit => &self.openai,
            Source::X => &self.xai,
        }
    }

    pub fn base_url(&self, source: Source) -> &str {
        match source {
            Source::Reddit => self.openai.base_url_or(OPENAI_BASE_URL),
            Source::X => self.xai.base_url_or(XAI_BASE_URL),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            retry_threshold: self.research.retry_threshold,
            scoring: self.scoring.clone(),
            context: ContextLimits {
                top_n: self.research.context_top_n,
                max_chars: self.research.context_max_chars,
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn available(sources: &[Source]) -> Availability {
        Availability {
            available: sources.iter().copied().collect(),
        }
    }

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.research.days, 30);
        assert_eq!(config.research.retry_threshold, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.scoring, ScoringPolicy::default());
        assert!(config.availability().available.is_empty());
        assert_eq!(config.openai.model(), None);
        assert_eq!(config.base_url(Source::X), XAI_BASE_URL);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config = Config::from_toml("[openai]\napi_key = \"sk-test\"\nmodel = \"gpt-x\"\n").unwrap();
        assert_eq!(config.availability(), available(&[Source::Reddit]));
        assert_eq!(config.openai.model(), Some("gpt-x"));
        assert_eq!(config.research.context_max_chars, 4000);
        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.context.top_n, 5);
        assert_eq!(pipeline.retry_threshold, 5);
    }

    #[test]
    fn test_window_length_is_validated() {
        for days in ["0", "366", "4294967295"] {
            let err = Config::from_toml(&format!("[research]\ndays = {days}\n")).unwrap_err();
            assert!(err.to_string().contains("research.days"), "days = {days}: {err}");
        }
        let config = Config::from_toml("[research]\ndays = 365\n").unwrap();
        assert_eq!(config.research.days, 365);
    }

    #[test]
    fn test_auto_mode_follows_availability() {
        let both = available(&[Source::Reddit, Source::X]);
        assert_eq!(resolve_mode(SourcesArg::Auto, false, &both), Ok(SourceMode::Both));
        assert_eq!(resolve_mode(SourcesArg::Auto, true, &both), Ok(SourceMode::All));
        assert_eq!(
            resolve_mode(SourcesArg::Auto, false, &available(&[Source::X])),
            Ok(SourceMode::X)
        );
        assert_eq!(
            resolve_mode(SourcesArg::Auto, true, &available(&[Source::Reddit])),
            Ok(SourceMode::RedditWeb)
        );
        assert_eq!(
            resolve_mode(SourcesArg::Auto, false, &Availability::default()),
            Ok(SourceMode::Web)
        );
    }

    #[test]
    fn test_explicit_source_requires_credentials() {
        let err = resolve_mode(SourcesArg::Both, false, &available(&[Source::Reddit])).unwrap_err();
        assert_eq!(err.missing, vec!["X"]);
        assert!(err.to_string().contains("XAI_API_KEY"));

        assert_eq!(
            resolve_mode(SourcesArg::Reddit, true, &available(&[Source::Reddit])),
            Ok(SourceMode::RedditWeb)
        );
        assert_eq!(
            resolve_mode(SourcesArg::Both, false, &Availability::all()),
            Ok(SourceMode::Both)
        );
    }
}
