//! Date window calculation and defensive timestamp parsing

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use last30days_types::{DateConfidence, DateWindow};
use serde_json::Value;

/// Epoch values above this are taken as milliseconds
const EPOCH_MILLIS_THRESHOLD: f64 = 1e12;

/// Longest accepted window
pub const MAX_WINDOW_DAYS: u32 = 365;

/// Trailing `days`-day window ending on `now`'s UTC date.
///
/// `days` is clamped into `1..=MAX_WINDOW_DAYS`.
pub fn trailing_window(now: DateTime<Utc>, days: u32) -> DateWindow {
    let days = days.clamp(1, MAX_WINDOW_DAYS);
    let to = now.date_naive();
    let from = to
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    DateWindow::new(from, to)
}

/// A timestamp resolved from an upstream value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    pub value: Option<DateTime<Utc>>,
    pub confidence: DateConfidence,
}

impl ParsedTimestamp {
    fn absolute(value: DateTime<Utc>) -> Self {
        Self {
            value: Some(value),
            confidence: DateConfidence::High,
        }
    }

    fn relative(value: DateTime<Utc>) -> Self {
        Self {
            value: Some(value),
            confidence: DateConfidence::Med,
        }
    }

    pub fn invalid() -> Self {
        Self {
            value: None,
            confidence: DateConfidence::Low,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }
}

/// Resolve an upstream date value. Never fails: unreadable input is `invalid()`.
///
/// Accepts epoch seconds (or milliseconds), ISO-8601 / RFC 3339, a handful of
/// written date formats, and relative phrases ("3 days ago", "5h", "yesterday")
/// resolved against `now`.
pub fn parse_timestamp(value: Option<&Value>, now: DateTime<Utc>) -> ParsedTimestamp {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .and_then(from_epoch)
            .map_or_else(ParsedTimestamp::invalid, ParsedTimestamp::absolute),
        Some(Value::String(s)) => parse_timestamp_str(s, now),
        _ => ParsedTimestamp::invalid(),
    }
}

/// Epoch seconds (or milliseconds) to UTC
pub fn from_epoch(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    let secs = if secs > EPOCH_MILLIS_THRESHOLD {
        secs / 1000.0
    } else {
        secs
    };
    Utc.timestamp_opt(secs.trunc() as i64, 0).single()
}

fn parse_timestamp_str(raw: &str, now: DateTime<Utc>) -> ParsedTimestamp {
    let s = raw.trim();
    if s.is_empty() {
        return ParsedTimestamp::invalid();
    }

    if s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return s
            .parse::<f64>()
            .ok()
            .and_then(from_epoch)
            .map_or_else(ParsedTimestamp::invalid, ParsedTimestamp::absolute);
    }

    if let Some(ts) = parse_absolute(s) {
        return ParsedTimestamp::absolute(ts);
    }

    parse_relative(s, now).map_or_else(ParsedTimestamp::invalid, ParsedTimestamp::relative)
}

fn parse_absolute(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y", "%d %B %Y"];
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }

    None
}

/// "3 days ago", "5h", "an hour ago", "yesterday", "2 weeks ago"
fn parse_relative(s: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lower = s.to_ascii_lowercase();
    let phrase = lower.trim().trim_end_matches("ago").trim();

    match phrase {
        "now" | "just now" | "today" => return Some(now),
        "yesterday" => return now.checked_sub_signed(Duration::try_days(1)?),
        "last week" => return now.checked_sub_signed(Duration::try_weeks(1)?),
        "last month" => return now.checked_sub_signed(Duration::try_days(30)?),
        _ => {}
    }

    let split = phrase
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(phrase.len());
    let (amount, unit) = if split == 0 {
        // "a day", "an hour", "one week"
        let (word, rest) = phrase.split_once(' ')?;
        match word {
            "a" | "an" | "one" => (1, rest.trim()),
            _ => return None,
        }
    } else {
        let amount: i64 = phrase[..split].parse().ok()?;
        (amount, phrase[split..].trim())
    };

    // Model output can carry absurd amounts; any overflow is unparsable
    let span = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Duration::try_seconds(amount),
        "m" | "min" | "mins" | "minute" | "minutes" => Duration::try_minutes(amount),
        "h" | "hr" | "hrs" | "hour" | "hours" => Duration::try_hours(amount),
        "d" | "day" | "days" => Duration::try_days(amount),
        "w" | "wk" | "wks" | "week" | "weeks" => Duration::try_weeks(amount),
        "mo" | "mos" | "month" | "months" => amount.checked_mul(30).and_then(Duration::try_days),
        "y" | "yr" | "yrs" | "year" | "years" => amount.checked_mul(365).and_then(Duration::try_days),
        _ => return None,
    }?;
    now.checked_sub_signed(span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).single().unwrap_or_default()
    }

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).single().unwrap_or_default()
    }

    #[test]
    fn test_trailing_window() {
        let window = trailing_window(now(), 30);
        assert_eq!(window.to, now().date_naive());
        assert_eq!(window.from.to_string(), "2025-12-16");
    }

    #[test]
    fn test_trailing_window_clamps_length() {
        let widest = trailing_window(now(), u32::MAX);
        assert_eq!(widest.from.to_string(), "2025-01-15");
        assert_eq!(widest.to, now().date_naive());

        let narrowest = trailing_window(now(), 0);
        assert_eq!(narrowest.from.to_string(), "2026-01-14");
    }

    #[test]
    fn test_absolute_forms() {
        let cases = [
            json!("2026-01-10"),
            json!("2026-01-10T00:00:00Z"),
            json!("2026-01-10T00:00:00"),
            json!("Jan 10, 2026"),
            json!(1768003200),
            json!("1768003200"),
            json!(1768003200000_u64),
        ];
        for case in cases {
            let parsed = parse_timestamp(Some(&case), now());
            assert_eq!(parsed.value, Some(ymd(2026, 1, 10)), "case {case}");
            assert_eq!(parsed.confidence, DateConfidence::High);
        }
    }

    #[test]
    fn test_relative_forms() {
        let cases = [
            ("5 days ago", Duration::days(5)),
            ("3d", Duration::days(3)),
            ("an hour ago", Duration::hours(1)),
            ("2 weeks ago", Duration::weeks(2)),
            ("yesterday", Duration::days(1)),
            ("45m", Duration::minutes(45)),
        ];
        for (text, span) in cases {
            let parsed = parse_timestamp(Some(&json!(text)), now());
            assert_eq!(parsed.value, Some(now() - span), "case {text}");
            assert_eq!(parsed.confidence, DateConfidence::Med);
        }
    }

    #[test]
    fn test_unparsable_is_invalid_not_error() {
        for value in [json!("sometime recently"), json!(""), json!(null), json!(true), json!(-5)] {
            let parsed = parse_timestamp(Some(&value), now());
            assert!(!parsed.is_valid(), "case {value}");
            assert_eq!(parsed.confidence, DateConfidence::Low);
        }
        assert!(!parse_timestamp(None, now()).is_valid());
    }

    #[test]
    fn test_out_of_range_relative_is_invalid() {
        for text in [
            "1000000 years ago",
            "9999999999999 days ago",
            "9223372036854775807 months ago",
            "9223372036854775807s",
            "99999999999999 weeks ago",
        ] {
            let parsed = parse_timestamp(Some(&json!(text)), now());
            assert_eq!(parsed, ParsedTimestamp::invalid(), "case {text}");
        }
    }
}
