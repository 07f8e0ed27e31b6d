//! Mapping source-shaped raw hits into [`NormalizedItem`]

use crate::dates::{from_epoch, parse_timestamp, ParsedTimestamp};
use chrono::{DateTime, Utc};
use last30days_types::{DateConfidence, NormalizedItem, RawItem, RedditRaw, Source, XRaw};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

const DEFAULT_RELEVANCE: f64 = 0.5;
const X_TITLE_CHARS: usize = 120;

/// Query parameters that only track where a link was shared from
const TRACKING_PARAMS: &[&str] = &[
    "ref", "ref_src", "ref_url", "s", "t", "si", "fbclid", "gclid", "context", "share_id",
];

/// Host prefixes that point at the same content
const HOST_PREFIXES: &[&str] = &["www.", "old.", "new.", "np.", "m.", "mobile."];

/// Normalize one source's raw hits. Items of the other source and items
/// without a usable URL are dropped.
pub fn normalize(raw_items: &[RawItem], source: Source, as_of: DateTime<Utc>) -> Vec<NormalizedItem> {
    let mut items = Vec::with_capacity(raw_items.len());
    for raw in raw_items {
        let normalized = match (source, raw) {
            (Source::Reddit, RawItem::Reddit(r)) => normalize_reddit(r, raw, as_of),
            (Source::X, RawItem::X(x)) => normalize_x(x, raw, as_of),
            _ => {
                debug!(%source, other = %raw.source(), "Skipping item from another source");
                continue;
            }
        };
        match normalized {
            Some(item) => items.push(item),
            None => debug!(%source, url = ?raw.url(), "Dropping item without a resolvable URL"),
        }
    }
    items
}

fn normalize_reddit(r: &RedditRaw, raw: &RawItem, as_of: DateTime<Utc>) -> Option<NormalizedItem> {
    let url = r.url.as_deref()?;
    let identity_key = identity_key(url)?;
    let detail = r.enrichment.as_ref();

    // Enrichment carries the real creation time; the model's date is a fallback
    let parsed = detail
        .and_then(|d| d.created_utc)
        .and_then(from_epoch)
        .map(|ts| ParsedTimestamp {
            value: Some(ts),
            confidence: DateConfidence::High,
        })
        .unwrap_or_else(|| parse_timestamp(r.date.as_ref(), as_of));

    let mut engagement = BTreeMap::new();
    let upvotes = detail.and_then(|d| d.score).or(r.score);
    let comments = detail.and_then(|d| d.num_comments).or(r.num_comments);
    let ratio = detail.and_then(|d| d.upvote_ratio).or(r.upvote_ratio);
    if let Some(v) = upvotes {
        engagement.insert("upvotes".to_string(), v as f64);
    }
    if let Some(v) = comments {
        engagement.insert("comments".to_string(), v as f64);
    }
    if let Some(v) = ratio {
        engagement.insert("upvote_ratio".to_string(), v.clamp(0.0, 1.0));
    }

    Some(NormalizedItem {
        source: Source::Reddit,
        identity_key,
        url: url.to_string(),
        title: r.title.clone().unwrap_or_else(|| "(untitled thread)".to_string()),
        author_or_handle: detail
            .and_then(|d| d.author.clone())
            .or_else(|| r.author.clone()),
        text: detail
            .and_then(|d| d.selftext.clone())
            .or_else(|| r.selftext.clone()),
        community: r
            .subreddit
            .as_deref()
            .map(|s| s.trim_start_matches("r/").trim_start_matches("/r/").to_string()),
        timestamp: parsed.value,
        timestamp_valid: parsed.is_valid(),
        date_confidence: parsed.confidence,
        engagement,
        relevance: relevance(r.relevance),
        why_relevant: r.why_relevant.clone(),
        raw_ref: raw.clone(),
    })
}

fn normalize_x(x: &XRaw, raw: &RawItem, as_of: DateTime<Utc>) -> Option<NormalizedItem> {
    let url = x.url.as_deref()?;
    let identity_key = identity_key(url)?;
    let parsed = parse_timestamp(x.date.as_ref(), as_of);

    let mut engagement = BTreeMap::new();
    for (key, value) in [
        ("likes", x.likes),
        ("reposts", x.reposts),
        ("replies", x.replies),
        ("quotes", x.quotes),
    ] {
        if let Some(v) = value {
            engagement.insert(key.to_string(), v as f64);
        }
    }

    let handle = x
        .author_handle
        .as_deref()
        .map(|h| h.trim_start_matches('@').to_string())
        .filter(|h| !h.is_empty());

    Some(NormalizedItem {
        source: Source::X,
        identity_key,
        url: url.to_string(),
        title: x
            .text
            .as_deref()
            .map(x_title)
            .unwrap_or_else(|| "(no text)".to_string()),
        author_or_handle: handle,
        text: x.text.clone(),
        community: None,
        timestamp: parsed.value,
        timestamp_valid: parsed.is_valid(),
        date_confidence: parsed.confidence,
        engagement,
        relevance: relevance(x.relevance),
        why_relevant: x.why_relevant.clone(),
        raw_ref: raw.clone(),
    })
}

fn relevance(value: Option<f64>) -> f64 {
    value
        .filter(|v| v.is_finite())
        .map_or(DEFAULT_RELEVANCE, |v| v.clamp(0.0, 1.0))
}

/// First line of a post, bounded
fn x_title(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= X_TITLE_CHARS {
        line.to_string()
    } else {
        let cut: String = line.chars().take(X_TITLE_CHARS - 1).collect();
        format!("{}…", cut.trim_end())
    }
}

/// Canonical identity for a URL: `https://<host><path>[?<sorted params>]`.
///
/// Lower-cases host and path, drops tracking parameters and the fragment,
/// folds mirror hosts (`old.reddit.com`, `twitter.com`) together and trims a
/// trailing slash. Returns `None` for anything that is not an http(s) URL.
pub fn identity_key(raw_url: &str) -> Option<String> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let parsed = Url::parse(&candidate).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let mut host = parsed.host_str()?.to_ascii_lowercase();
    if let Some(stripped) = HOST_PREFIXES.iter().find_map(|p| host.strip_prefix(p)) {
        host = stripped.to_string();
    }
    if host == "twitter.com" {
        host = "x.com".to_string();
    }
    if !host.contains('.') {
        return None;
    }

    let path = parsed.path().to_ascii_lowercase();
    let path = path.trim_end_matches('/');

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    let mut key = format!("https://{host}{path}");
    if !params.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        key.push('?');
        key.push_str(&query);
    }
    Some(key)
}

fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}
