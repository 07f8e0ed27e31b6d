//! Directive handed to the caller when a mode needs generic web coverage.
//! The pipeline never performs the web search itself.

use last30days_types::{ResearchQuery, WebSearchDirective};

/// Domains the caller should leave out; those sources are covered already
pub const EXCLUDED_DOMAINS: &[&str] = &["reddit.com", "x.com", "twitter.com"];

/// `Some` only for `all`, `web`, `reddit-web` and `x-web`
pub fn web_search_directive(query: &ResearchQuery) -> Option<WebSearchDirective> {
    if !query.source_mode.wants_web() {
        return None;
    }
    Some(WebSearchDirective {
        topic: query.topic.clone(),
        from: query.from,
        to: query.to,
        exclude_domains: EXCLUDED_DOMAINS.iter().map(|d| d.to_string()).collect(),
    })
}
