//! Per-source scoring and ranking
//!
//! `score = 100 * (wRel*relevance + wRec*recency + wEng*engagement) - penalty`
//!
//! Engagement is a weighted sum of `ln(1+x)` signals squashed into `[0, 1)`,
//! so more engagement never lowers a score. Reddit and X scores are not
//! comparable with each other; each list is ranked on its own.

use crate::config::ScoringPolicy;
use chrono::{NaiveTime, TimeZone, Utc};
use last30days_types::{DateWindow, NormalizedItem, ScoredItem, Source};
use std::cmp::Ordering;

/// Score and rank one source's items, best first
pub fn score_items(
    items: Vec<NormalizedItem>,
    window: &DateWindow,
    policy: &ScoringPolicy,
) -> Vec<ScoredItem> {
    let mut scored: Vec<ScoredItem> = items
        .into_iter()
        .map(|item| {
            let score = score_item(&item, window, policy);
            ScoredItem {
                item,
                score,
                rank: 0,
            }
        })
        .collect();
    sort_ranked(&mut scored);
    scored
}

/// Composite score for one item, rounded to two decimals and never negative
pub fn score_item(item: &NormalizedItem, window: &DateWindow, policy: &ScoringPolicy) -> f64 {
    let engagement = match raw_engagement(item) {
        Some(raw) => raw / (raw + policy.engagement_half_saturation),
        None => 0.0,
    };
    let penalty = if item.has_engagement() {
        0.0
    } else {
        policy.unknown_engagement_penalty
    };

    let blended = policy.relevance_weight * item.relevance
        + policy.recency_weight * recency(item, window)
        + policy.engagement_weight * engagement;
    let score = (100.0 * blended - penalty).max(0.0);
    (score * 100.0).round() / 100.0
}

/// Source-weighted `ln(1+x)` engagement, `None` when no signal is present
pub fn raw_engagement(item: &NormalizedItem) -> Option<f64> {
    if !item.has_engagement() {
        return None;
    }
    let log = |key: &str| item.engagement_value(key).max(0.0).ln_1p();
    let raw = match item.source {
        Source::Reddit => {
            0.55 * log("upvotes")
                + 0.40 * log("comments")
                + 0.05 * (item.engagement_value("upvote_ratio").clamp(0.0, 1.0) * 10.0)
        }
        Source::X => {
            0.55 * log("likes") + 0.25 * log("reposts") + 0.15 * log("replies") + 0.05 * log("quotes")
        }
    };
    Some(raw)
}

/// Age is measured from 00:00 UTC on `to`: 1.0 anywhere on `to`, 0.0 at
/// (or before) the start of `from`
fn recency(item: &NormalizedItem, window: &DateWindow) -> f64 {
    let Some(ts) = item.timestamp else {
        return 0.0;
    };
    let to = Utc.from_utc_datetime(&window.to.and_time(NaiveTime::MIN));
    let span = (window.len_days() * 86_400) as f64;
    let age = (to - ts).num_seconds() as f64;
    (1.0 - age / span).clamp(0.0, 1.0)
}

/// Sort by score descending, newer first on ties, then reassign 1-based ranks.
///
/// The sort is stable, so fully tied items keep their incoming order.
pub fn sort_ranked(items: &mut [ScoredItem]) {
    items.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| newer_first(a, b))
    });
    for (i, item) in items.iter_mut().enumerate() {
        item.rank = i + 1;
    }
}

fn newer_first(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    b.item.timestamp.cmp(&a.item.timestamp)
}
