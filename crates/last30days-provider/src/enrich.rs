//! Reddit thread enrichment through Reddit's public JSON listing

use crate::error::{ProviderError, Result};
use crate::ThreadEnricher;
use async_trait::async_trait;
use last30days_types::lenient::{count_from_value, float_from_value};
use last30days_types::{ThreadComment, ThreadDetail};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("last30days/", env!("CARGO_PKG_VERSION"), " (research CLI)");

/// Comments kept per thread, highest score first
const MAX_TOP_COMMENTS: usize = 10;
/// Excerpts surfaced as insights
const MAX_INSIGHTS: usize = 7;
const EXCERPT_CHARS: usize = 200;
const MIN_INSIGHT_CHARS: usize = 30;

/// Fetches `<thread>.json` from Reddit
#[derive(Clone, Debug, Default)]
pub struct RedditThreadEnricher {
    http: reqwest::Client,
}

impl RedditThreadEnricher {
    /// Enricher with a fresh HTTP client
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadEnricher for RedditThreadEnricher {
    async fn enrich(&self, url: &str, timeout: Duration) -> Result<ThreadDetail> {
        let json_url = thread_json_url(url)?;
        debug!(url = %json_url, "Fetching thread detail");

        let response = self
            .http
            .get(&json_url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(timeout.as_secs())
                } else {
                    ProviderError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let listing: Value = response.json().await?;
        parse_thread_listing(&listing)
    }
}

/// `https://www.reddit.com/r/x/comments/id/slug/?utm=1` → `.../slug.json?raw_json=1`
fn thread_json_url(url: &str) -> Result<String> {
    let base = url.split(['?', '#']).next().unwrap_or_default().trim_end_matches('/');
    if !base.contains("/comments/") {
        return Err(ProviderError::Parse(format!("not a Reddit thread URL: {url}")));
    }
    Ok(format!("{base}.json?raw_json=1&limit=50"))
}

/// Read the two-listing payload Reddit returns for a thread
pub(crate) fn parse_thread_listing(listing: &Value) -> Result<ThreadDetail> {
    let listings = listing
        .as_array()
        .ok_or_else(|| ProviderError::Parse("thread payload is not an array".into()))?;

    let post = listings
        .first()
        .and_then(|l| l.pointer("/data/children/0/data"))
        .ok_or_else(|| ProviderError::Parse("thread payload has no submission".into()))?;

    let mut comments: Vec<ThreadComment> = listings
        .get(1)
        .and_then(|l| l.pointer("/data/children"))
        .and_then(Value::as_array)
        .map(|children| children.iter().filter_map(read_comment).collect())
        .unwrap_or_default();
    comments.sort_by(|a, b| b.score.cmp(&a.score));
    comments.truncate(MAX_TOP_COMMENTS);

    let insights = comments
        .iter()
        .filter(|c| c.excerpt.chars().count() >= MIN_INSIGHT_CHARS)
        .take(MAX_INSIGHTS)
        .map(|c| c.excerpt.clone())
        .collect();

    Ok(ThreadDetail {
        score: post.get("score").and_then(count_from_value),
        num_comments: post.get("num_comments").and_then(count_from_value),
        upvote_ratio: post.get("upvote_ratio").and_then(float_from_value),
        created_utc: post.get("created_utc").and_then(float_from_value),
        author: post.get("author").and_then(Value::as_str).map(str::to_string),
        selftext: post
            .get("selftext")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        top_comments: comments,
        insights,
    })
}

fn read_comment(child: &Value) -> Option<ThreadComment> {
    if child.get("kind").and_then(Value::as_str) != Some("t1") {
        return None;
    }
    let data = child.get("data")?;
    let body = data.get("body").and_then(Value::as_str)?.trim();
    if body.is_empty() || body == "[deleted]" || body == "[removed]" {
        return None;
    }
    let author = data.get("author").and_then(Value::as_str).unwrap_or("[deleted]");
    if author == "AutoModerator" {
        return None;
    }

    Some(ThreadComment {
        score: data.get("score").and_then(Value::as_i64).unwrap_or(0),
        author: author.to_string(),
        excerpt: excerpt(body),
        url: data
            .get("permalink")
            .and_then(Value::as_str)
            .map(|p| format!("https://www.reddit.com{p}")),
    })
}

fn excerpt(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(EXCERPT_CHARS - 1).collect();
        format!("{}…", cut.trim_end())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn comment(score: i64, author: &str, body: &str) -> Value {
        json!({"kind": "t1", "data": {"score": score, "author": author, "body": body,
               "permalink": format!("/r/rust/comments/abc/t/{score}/")}})
    }

    #[test]
    fn test_thread_json_url() {
        assert_eq!(
            thread_json_url("https://www.reddit.com/r/rust/comments/abc/tokio/?utm_source=share#top").unwrap(),
            "https://www.reddit.com/r/rust/comments/abc/tokio.json?raw_json=1&limit=50"
        );
        assert!(thread_json_url("https://www.reddit.com/r/rust/").is_err());
    }

    #[test]
    fn test_parse_thread_listing() {
        let listing = json!([
            {"data": {"children": [{"kind": "t3", "data": {
                "score": 512, "num_comments": 87, "upvote_ratio": 0.97,
                "created_utc": 1767225600.0, "author": "ferris", "selftext": ""
            }}]}},
            {"data": {"children": [
                comment(3, "a", "short"),
                comment(40, "b", "Tokio remains the default choice for most production services."),
                comment(90, "AutoModerator", "Please read the rules before posting anything here."),
                comment(12, "c", "[deleted]"),
                {"kind": "more", "data": {}}
            ]}}
        ]);

        let detail = parse_thread_listing(&listing).unwrap();
        assert_eq!(detail.score, Some(512));
        assert_eq!(detail.num_comments, Some(87));
        assert_eq!(detail.created_utc, Some(1767225600.0));
        assert_eq!(detail.selftext, None);
        assert_eq!(detail.top_comments.len(), 2);
        assert_eq!(detail.top_comments[0].author, "b");
        assert_eq!(detail.insights.len(), 1);
        assert!(detail.top_comments[0]
            .url
            .as_deref()
            .unwrap()
            .starts_with("https://www.reddit.com/r/rust/"));
    }

    #[test]
    fn test_parse_rejects_non_listing() {
        assert!(parse_thread_listing(&json!({"error": 404})).is_err());
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let long = "word ".repeat(100);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), EXCERPT_CHARS);
        assert!(cut.ends_with('…'));
    }
}
