//! Reading hit lists out of model responses

use crate::error::{ProviderError, Result};
use last30days_types::{RawItem, RedditRaw, Source, XRaw};
use serde_json::Value;
use tracing::debug;

const RESERVED_TAG: &str = "source";
const REPORTED_TAG: &str = "reported_source";

/// Parse a model response into source-tagged raw items.
///
/// Accepts `{"items": [...]}`, a bare array, or either wrapped in prose or a
/// fenced code block. Entries that are not objects are skipped.
pub(crate) fn parse_items(source: Source, text: &str) -> Result<Vec<RawItem>> {
    let value = extract_json(text)?;
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(ProviderError::Parse(format!(
                    "\"items\" is not an array: {}",
                    type_name(&other)
                )))
            }
            None => Vec::new(),
        },
        other => {
            return Err(ProviderError::Parse(format!(
                "expected an object or array, got {}",
                type_name(&other)
            )))
        }
    };

    let mut items = Vec::with_capacity(entries.len());
    for entry in entries {
        if !entry.is_object() {
            debug!(%source, "Skipping non-object entry: {}", type_name(&entry));
            continue;
        }
        let item = match source {
            Source::Reddit => {
                serde_json::from_value::<RedditRaw>(move_reserved_keys(entry)).map(RawItem::Reddit)
            }
            Source::X => serde_json::from_value::<XRaw>(move_reserved_keys(hoist_engagement(entry)))
                .map(RawItem::X),
        };
        match item {
            Ok(item) => items.push(item),
            Err(e) => debug!(%source, "Skipping unreadable entry: {}", e),
        }
    }
    Ok(items)
}

/// Locate the JSON document inside a model response
fn extract_json(text: &str) -> Result<Value> {
    let trimmed = strip_code_fence(text.trim());
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    // Fall back to the widest bracketed span, outermost opener first
    let mut candidates = [('{', '}'), ('[', ']')];
    candidates.sort_by_key(|(open, _)| trimmed.find(*open).unwrap_or(usize::MAX));
    for (open, close) in candidates {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                    return Ok(value);
                }
            }
        }
    }

    Err(ProviderError::Parse(format!(
        "no JSON found in response ({} chars)",
        text.len()
    )))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (```json)
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// X responses nest counts under `engagement`; lift them to the top level
fn hoist_engagement(mut entry: Value) -> Value {
    if let Some(map) = entry.as_object_mut() {
        if let Some(Value::Object(engagement)) = map.remove("engagement") {
            for (key, value) in engagement {
                map.entry(key).or_insert(value);
            }
        }
    }
    entry
}

/// `source` tags the serialized `RawItem`; a model-supplied `source` is kept
/// under `reported_source` so the dump carries one unambiguous tag
fn move_reserved_keys(mut entry: Value) -> Value {
    if let Some(map) = entry.as_object_mut() {
        if let Some(reported) = map.remove(RESERVED_TAG) {
            map.entry(REPORTED_TAG).or_insert(reported);
        }
    }
    entry
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
