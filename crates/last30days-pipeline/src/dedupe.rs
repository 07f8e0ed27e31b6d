//! Per-source deduplication by identity key

use crate::score::sort_ranked;
use last30days_types::ScoredItem;
use std::collections::HashMap;
use tracing::debug;

/// Collapse items sharing an `identity_key`, keeping the highest score.
///
/// On equal scores the earliest-seen item wins. The survivor takes its
/// group's first position before the list is re-sorted, so
/// `dedupe(dedupe(xs)) == dedupe(xs)`.
pub fn dedupe(items: Vec<ScoredItem>) -> Vec<ScoredItem> {
    let before = items.len();
    let mut kept: Vec<ScoredItem> = Vec::with_capacity(before);
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(before);

    for item in items {
        match slots.get(item.identity_key()) {
            Some(&slot) => {
                if item.score > kept[slot].score {
                    kept[slot] = item;
                }
            }
            None => {
                slots.insert(item.identity_key().to_string(), kept.len());
                kept.push(item);
            }
        }
    }

    if kept.len() < before {
        debug!(removed = before - kept.len(), kept = kept.len(), "Removed duplicates");
    }
    sort_ranked(&mut kept);
    kept
}
