//! Embedded body extraction.
//!
//! Provider protocol logging stores HTTP request and response payloads as
//! JSON text inside string fields. This module finds those fields and
//! decodes their payloads, falling back to the first brace-delimited
//! substring and finally to the raw text.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::extract::is_truthy;
use crate::models::{BodyValue, NewJsonBody};
use crate::rules::Rules;

static BRACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("brace pattern must compile"));

/// Decodes a textual payload: whole text, then the outermost `{...}` span,
/// then the text as-is.
pub fn decode_body_text(text: &str) -> BodyValue {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return BodyValue::Json(value);
    }
    if let Some(m) = BRACED.find(text) {
        if let Ok(value) = serde_json::from_str::<Value>(m.as_str()) {
            return BodyValue::Json(value);
        }
    }
    BodyValue::Raw(text.to_string())
}

/// One `(field, payload)` pair per present, non-empty body field, in the
/// order the fields are declared in `rules`.
pub fn extract_bodies(rules: &Rules, obj: &Value) -> Vec<(String, BodyValue)> {
    rules
        .body_fields
        .iter()
        .filter_map(|field| {
            let value = obj.get(field.as_str()).filter(|v| is_truthy(v))?;
            let body = match value {
                Value::String(text) => decode_body_text(text),
                structured => BodyValue::Json(structured.clone()),
            };
            Some((field.clone(), body))
        })
        .collect()
}

/// Text stored for a body. Decoded payloads are re-serialized compactly.
pub fn body_to_text(body: &BodyValue) -> String {
    match body {
        BodyValue::Json(value) => value.to_string(),
        BodyValue::Raw(text) => text.clone(),
    }
}

pub fn prepare_bodies(bodies: &[(String, BodyValue)]) -> Vec<NewJsonBody> {
    bodies
        .iter()
        .map(|(field, body)| NewJsonBody {
            body_type: field.clone(),
            body_json: body_to_text(body),
        })
        .collect()
}
