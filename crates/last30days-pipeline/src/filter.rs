//! Hard date filter
//!
//! Search capabilities are asked to stay inside the window but nothing holds
//! them to it. This filter is the only enforced recency guarantee and must run
//! after normalization and before scoring.

use last30days_types::{DateWindow, NormalizedItem};
use tracing::debug;

/// Keep items whose timestamp is valid and inside `window`
pub fn filter_by_window(items: Vec<NormalizedItem>, window: &DateWindow) -> Vec<NormalizedItem> {
    let before = items.len();
    let kept: Vec<NormalizedItem> = items
        .into_iter()
        .filter(|item| in_window(item, window))
        .collect();
    if kept.len() < before {
        debug!(
            dropped = before - kept.len(),
            kept = kept.len(),
            from = %window.from,
            to = %window.to,
            "Hard date filter dropped items"
        );
    }
    kept
}

fn in_window(item: &NormalizedItem, window: &DateWindow) -> bool {
    item.timestamp_valid && item.timestamp.is_some_and(|ts| window.contains(&ts))
}
