//! Tolerant deserializers for model-produced payloads
//!
//! Search capabilities are LLM-backed, so numeric fields arrive as numbers,
//! numeric strings ("1.2k", "3,400") or garbage. None of these helpers fail:
//! anything unreadable becomes `None`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Read a count such as `42`, `"42"`, `"3,400"`, `"1.2k"` or `"2M"`
pub fn count_from_value(value: &Value) -> Option<u64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_count_str(s)?,
        _ => return None,
    };
    if n.is_finite() && n >= 0.0 {
        Some(n.round() as u64)
    } else {
        None
    }
}

/// Read a float such as `0.8` or `"0.8"`
pub fn float_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Read a non-empty trimmed string; numbers are stringified
pub fn string_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_count_str(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_' && !c.is_whitespace())
        .collect();
    let lower = cleaned.to_ascii_lowercase();
    let (digits, multiplier) = match lower.chars().last()? {
        'k' => (&lower[..lower.len() - 1], 1_000.0),
        'm' => (&lower[..lower.len() - 1], 1_000_000.0),
        _ => (lower.as_str(), 1.0),
    };
    digits.parse::<f64>().ok().map(|n| n * multiplier)
}

/// `#[serde(deserialize_with = "lenient::count")]`
pub fn count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_value))
}

/// `#[serde(deserialize_with = "lenient::float")]`
pub fn float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(float_from_value))
}

/// `#[serde(deserialize_with = "lenient::string")]`
pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(string_from_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_forms() {
        assert_eq!(count_from_value(&json!(42)), Some(42));
        assert_eq!(count_from_value(&json!("3,400")), Some(3400));
        assert_eq!(count_from_value(&json!("1.2k")), Some(1200));
        assert_eq!(count_from_value(&json!("2M")), Some(2_000_000));
        assert_eq!(count_from_value(&json!("lots")), None);
        assert_eq!(count_from_value(&json!(-3)), None);
        assert_eq!(count_from_value(&json!(null)), None);
    }

    #[test]
    fn test_float_and_string_forms() {
        assert_eq!(float_from_value(&json!("0.75")), Some(0.75));
        assert_eq!(float_from_value(&json!([1])), None);
        assert_eq!(string_from_value(&json!("  hi ")), Some("hi".to_string()));
        assert_eq!(string_from_value(&json!("   ")), None);
        assert_eq!(string_from_value(&json!(7)), Some("7".to_string()));
    }
}
