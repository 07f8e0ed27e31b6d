//! Builders shared by the unit tests

use chrono::{DateTime, NaiveDate, Utc};
use last30days_types::{
    DateConfidence, DateWindow, NormalizedItem, RawItem, RedditRaw, ScoredItem, Source, XRaw,
};

pub(crate) fn window() -> DateWindow {
    DateWindow::new(
        NaiveDate::from_ymd_opt(2025, 12, 16).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap_or_default(),
    )
}

pub(crate) fn normalized(
    source: Source,
    key: &str,
    timestamp: Option<DateTime<Utc>>,
    engagement: &[(&str, f64)],
) -> NormalizedItem {
    let raw_ref = match source {
        Source::Reddit => RawItem::Reddit(RedditRaw {
            url: Some(key.to_string()),
            ..RedditRaw::default()
        }),
        Source::X => RawItem::X(XRaw {
            url: Some(key.to_string()),
            ..XRaw::default()
        }),
    };
    NormalizedItem {
        source,
        identity_key: key.to_string(),
        url: key.to_string(),
        title: key.to_string(),
        author_or_handle: None,
        text: None,
        community: None,
        timestamp,
        timestamp_valid: timestamp.is_some(),
        date_confidence: if timestamp.is_some() {
            DateConfidence::High
        } else {
            DateConfidence::Low
        },
        engagement: engagement
            .iter()
            .map(|(k, v)| ((*k).to_string(), *v))
            .collect(),
        relevance: 0.5,
        why_relevant: None,
        raw_ref,
    }
}

pub(crate) fn scored(key: &str, score: f64, title: &str) -> ScoredItem {
    let mut item = normalized(Source::Reddit, key, None, &[]);
    item.title = title.to_string();
    ScoredItem {
        item,
        score,
        rank: 0,
    }
}
