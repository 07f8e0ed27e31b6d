//! last30days Types - Core types for the last30days research pipeline
//!
//! This module defines the query, item and report types shared by the
//! provider, pipeline and CLI crates.

#![deny(unsafe_code, unused_imports, unused_variables)]

mod item;
pub mod lenient;
mod raw;
mod report;

pub use item::{DateConfidence, NormalizedItem, ScoredItem};
pub use raw::{RawItem, RedditRaw, ThreadComment, ThreadDetail, XRaw};
pub use report::{ModelsUsed, Report, UpstreamPayloads, WebSearchDirective};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Sources
// ============================================================================

/// A social source with its own search capability and engagement shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Reddit,
    X,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Reddit, Source::X];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Reddit => "reddit",
            Source::X => "x",
        }
    }

    /// Human label used in rendered output
    pub fn label(&self) -> &'static str {
        match self {
            Source::Reddit => "Reddit",
            Source::X => "X",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Depth
// ============================================================================

/// Coarse volume control for how much each source is asked to return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Quick,
    #[default]
    Default,
    Deep,
}

/// Result-count hints and enrichment timeout for a depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthProfile {
    pub min_items: usize,
    pub max_items: usize,
    pub enrich_timeout_secs: u64,
}

impl Depth {
    pub fn profile(&self) -> DepthProfile {
        match self {
            Depth::Quick => DepthProfile {
                min_items: 8,
                max_items: 12,
                enrich_timeout_secs: 10,
            },
            Depth::Default => DepthProfile {
                min_items: 20,
                max_items: 30,
                enrich_timeout_secs: 15,
            },
            Depth::Deep => DepthProfile {
                min_items: 40,
                max_items: 60,
                enrich_timeout_secs: 20,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Quick => "quick",
            Depth::Default => "default",
            Depth::Deep => "deep",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Source mode
// ============================================================================

/// Which sources a run covers, including the generic web variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceMode {
    #[default]
    Auto,
    Reddit,
    X,
    Both,
    All,
    RedditWeb,
    XWeb,
    Web,
}

impl SourceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceMode::Auto => "auto",
            SourceMode::Reddit => "reddit",
            SourceMode::X => "x",
            SourceMode::Both => "both",
            SourceMode::All => "all",
            SourceMode::RedditWeb => "reddit-web",
            SourceMode::XWeb => "x-web",
            SourceMode::Web => "web",
        }
    }

    pub fn wants_reddit(&self) -> bool {
        matches!(
            self,
            SourceMode::Reddit | SourceMode::Both | SourceMode::All | SourceMode::RedditWeb
        )
    }

    pub fn wants_x(&self) -> bool {
        matches!(
            self,
            SourceMode::X | SourceMode::Both | SourceMode::All | SourceMode::XWeb
        )
    }

    /// Whether generic web coverage is requested from the caller
    pub fn wants_web(&self) -> bool {
        matches!(
            self,
            SourceMode::All | SourceMode::RedditWeb | SourceMode::XWeb | SourceMode::Web
        )
    }

    /// Sources that need a search capability for this mode
    pub fn sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|s| match s {
                Source::Reddit => self.wants_reddit(),
                Source::X => self.wants_x(),
            })
            .collect()
    }

    /// Promote a social-only mode to its web-including variant
    pub fn with_web(self) -> Self {
        match self {
            SourceMode::Reddit => SourceMode::RedditWeb,
            SourceMode::X => SourceMode::XWeb,
            SourceMode::Both => SourceMode::All,
            other => other,
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Date window
// ============================================================================

/// Inclusive day range `[from, to]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// First instant inside the window (00:00:00 UTC on `from`)
    pub fn start(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.from.and_time(NaiveTime::MIN))
    }

    /// First instant after the window (00:00:00 UTC the day after `to`)
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.to.and_time(NaiveTime::MIN)) + Duration::days(1)
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start() && *ts < self.end_exclusive()
    }

    /// Window length in whole days (at least 1)
    pub fn len_days(&self) -> i64 {
        (self.to - self.from).num_days().max(1)
    }
}

// ============================================================================
// Query
// ============================================================================

/// One research request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchQuery {
    pub topic: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub depth: Depth,
    pub source_mode: SourceMode,
    /// Instant the window was computed from; relative timestamps resolve against it
    pub as_of: DateTime<Utc>,
}

impl ResearchQuery {
    pub fn new(
        topic: impl Into<String>,
        window: DateWindow,
        depth: Depth,
        source_mode: SourceMode,
        as_of: DateTime<Utc>,
    ) -> Self {
        Self {
            topic: topic.into(),
            from: window.from,
            to: window.to,
            depth,
            source_mode,
            as_of,
        }
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.from, self.to)
    }

    /// Copy of this query with a different topic (used for broadened retries)
    pub fn with_topic(&self, topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn test_source_mode_sources() {
        assert_eq!(SourceMode::Both.sources(), vec![Source::Reddit, Source::X]);
        assert_eq!(SourceMode::XWeb.sources(), vec![Source::X]);
        assert!(SourceMode::Web.sources().is_empty());
        assert!(SourceMode::All.wants_web());
        assert!(!SourceMode::Both.wants_web());
    }

    #[test]
    fn test_with_web_promotion() {
        assert_eq!(SourceMode::Both.with_web(), SourceMode::All);
        assert_eq!(SourceMode::Reddit.with_web(), SourceMode::RedditWeb);
        assert_eq!(SourceMode::Web.with_web(), SourceMode::Web);
    }

    #[test]
    fn test_window_bounds_are_inclusive_days() {
        let window = DateWindow::new(date(2026, 1, 1), date(2026, 1, 31));
        let first = window.start();
        let last = window.end_exclusive() - Duration::seconds(1);
        assert!(window.contains(&first));
        assert!(window.contains(&last));
        assert!(!window.contains(&window.end_exclusive()));
        assert!(!window.contains(&(first - Duration::seconds(1))));
        assert_eq!(window.len_days(), 30);
    }

    #[test]
    fn test_depth_profiles_grow() {
        assert!(Depth::Quick.profile().max_items < Depth::Default.profile().min_items);
        assert!(Depth::Default.profile().max_items < Depth::Deep.profile().min_items);
    }
}
