//! Field extraction from parsed log lines.
//!
//! Pulls timestamp, severity, resource identifier and request id out of a
//! line. Structured object keys are consulted first, in the priority order
//! given by [`Rules`]; free-text patterns are the fallback. All functions
//! are pure and total: a missing field is `None`, never an error.

use serde_json::Value;

use crate::models::Level;
use crate::rules::Rules;

/// Renders an object value as a field string. `null` yields `None`.
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// JSON truthiness: `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Looks up the first key in `keys` present on `obj`.
///
/// The outer `Option` says whether any key was present; the inner one is
/// the value. A present key holding `null` still ends the search.
fn first_present(obj: &Value, keys: &[String]) -> Option<Option<String>> {
    keys.iter()
        .find_map(|key| obj.get(key.as_str()))
        .map(value_to_string)
}

/// First timestamp-looking substring of `text`, by pattern priority.
pub fn extract_timestamp(rules: &Rules, text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    rules.timestamp_patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.name("ts"))
            .map(|m| m.as_str().to_string())
    })
}

/// Explicit timestamp from the object's timestamp keys. Falsy values are
/// skipped.
pub fn timestamp_from_fields(rules: &Rules, obj: &Value) -> Option<String> {
    rules
        .timestamp_fields
        .iter()
        .filter_map(|key| obj.get(key.as_str()))
        .find(|v| is_truthy(v))
        .and_then(value_to_string)
}

/// Maps a literal level spelling onto a canonical level.
pub fn normalize_level(rules: &Rules, raw: &str) -> Option<Level> {
    let lower = raw.trim().to_lowercase();
    rules
        .level_aliases
        .iter()
        .find(|(_, spellings)| spellings.iter().any(|s| *s == lower))
        .map(|(level, _)| *level)
}

/// Level from the object's level keys. Keys whose value is not a known
/// spelling are passed over.
pub fn level_from_fields(rules: &Rules, obj: &Value) -> Option<Level> {
    rules.level_fields.iter().find_map(|key| {
        obj.get(key.as_str())
            .and_then(Value::as_str)
            .and_then(|raw| normalize_level(rules, raw))
    })
}

/// Keyword scan of lowercased text. The first bucket with any hit wins,
/// regardless of where in the text the hit occurs.
pub fn guess_level(rules: &Rules, text: &str) -> Option<Level> {
    if text.is_empty() {
        return None;
    }
    let low = text.to_lowercase();
    rules
        .level_keywords
        .iter()
        .find(|(_, words)| words.iter().any(|w| low.contains(w.as_str())))
        .map(|(level, _)| *level)
}

pub fn extract_level(rules: &Rules, obj: &Value, text: &str) -> Option<Level> {
    level_from_fields(rules, obj).or_else(|| guess_level(rules, text))
}

pub fn extract_resource(rules: &Rules, obj: &Value) -> Option<String> {
    first_present(obj, &rules.resource_fields).flatten()
}

/// Request id from the object's id keys, else from `key=value` patterns in
/// `text`.
pub fn extract_request_id(rules: &Rules, obj: &Value, text: &str) -> Option<String> {
    if let Some(found) = first_present(obj, &rules.request_id_fields) {
        return found;
    }
    if text.is_empty() {
        return None;
    }
    rules.request_id_patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}
