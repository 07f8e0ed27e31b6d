use last30days_types::{DepthProfile, ResearchQuery, Source};

pub(crate) const SYSTEM_PROMPT: &str = "You are a research assistant that finds recent social media \
     discussion. You answer with a single JSON object and nothing else.";

/// User prompt asking the search model for source-shaped JSON hits
pub(crate) fn search_prompt(source: Source, query: &ResearchQuery) -> String {
    let DepthProfile {
        min_items,
        max_items,
        ..
    } = query.depth.profile();

    match source {
        Source::Reddit => format!(
            "Find Reddit threads about: {topic}\n\
             Only include threads created between {from} and {to} (inclusive).\n\
             Return {min_items} to {max_items} threads if that many exist.\n\
             Respond with JSON of the form:\n\
             {{\"items\": [{{\"title\": string, \"url\": string (https://www.reddit.com/r/.../comments/...), \
             \"subreddit\": string, \"date\": \"YYYY-MM-DD\" or null, \
             \"why_relevant\": string, \"relevance\": number between 0 and 1}}]}}\n\
             Use real thread URLs only. Never invent threads.",
            topic = query.topic,
            from = query.from,
            to = query.to,
        ),
        Source::X => format!(
            "Search X (Twitter) posts about: {topic}\n\
             Only include posts published between {from} and {to} (inclusive).\n\
             Return {min_items} to {max_items} posts if that many exist.\n\
             Respond with JSON of the form:\n\
             {{\"items\": [{{\"text\": string, \"url\": string (https://x.com/<handle>/status/<id>), \
             \"author_handle\": string, \"date\": \"YYYY-MM-DD\" or null, \
             \"engagement\": {{\"likes\": int, \"reposts\": int, \"replies\": int, \"quotes\": int}}, \
             \"why_relevant\": string, \"relevance\": number between 0 and 1}}]}}\n\
             Use real post URLs only. Never invent posts.",
            topic = query.topic,
            from = query.from,
            to = query.to,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use last30days_types::{DateWindow, Depth, SourceMode};

    fn query(depth: Depth) -> ResearchQuery {
        let from = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or_default();
        let to = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap_or_default();
        ResearchQuery::new(
            "rust async runtimes",
            DateWindow::new(from, to),
            depth,
            SourceMode::Both,
            Utc.with_ymd_and_hms(2026, 1, 31, 12, 0, 0).single().unwrap_or_default(),
        )
    }

    #[test]
    fn test_prompt_carries_window_and_depth() {
        let prompt = search_prompt(Source::Reddit, &query(Depth::Quick));
        assert!(prompt.contains("rust async runtimes"));
        assert!(prompt.contains("2026-01-01"));
        assert!(prompt.contains("2026-01-31"));
        assert!(prompt.contains("8 to 12"));
    }

    #[test]
    fn test_x_prompt_asks_for_engagement() {
        let prompt = search_prompt(Source::X, &query(Depth::Deep));
        assert!(prompt.contains("\"likes\""));
        assert!(prompt.contains("40 to 60"));
    }
}
