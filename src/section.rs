//! Execution-phase classification.
//!
//! Each line is classified on its own; no phase state carries over between
//! lines. Text rules run in a fixed order (explicit phrase, start/end verb
//! next to a phase word, state refresh) and the object's `type` field is
//! consulted only when no text rule matched.

use serde_json::Value;

use crate::models::Section;
use crate::rules::Rules;

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

/// Explicit phrase match, plan phrases before apply phrases.
pub fn section_from_phrase(rules: &Rules, low: &str) -> Option<Section> {
    rules
        .section_phrases
        .iter()
        .find(|(_, phrases)| contains_any(low, phrases))
        .map(|(section, _)| *section)
}

/// A start or end verb appearing alongside "plan" or "apply".
pub fn section_from_boundary(rules: &Rules, low: &str) -> Option<Section> {
    if !contains_any(low, &rules.section_phase_words) {
        return None;
    }
    if contains_any(low, &rules.section_start_verbs) {
        Some(Section::Start)
    } else if contains_any(low, &rules.section_end_verbs) {
        Some(Section::End)
    } else {
        None
    }
}

pub fn section_from_refresh(rules: &Rules, low: &str) -> Option<Section> {
    contains_any(low, &rules.refresh_phrases).then_some(Section::Refresh)
}

/// Runs the text rules against one piece of text.
pub fn classify_text(rules: &Rules, text: &str) -> Option<Section> {
    if text.is_empty() {
        return None;
    }
    let low = text.to_lowercase();
    section_from_phrase(rules, &low)
        .or_else(|| section_from_boundary(rules, &low))
        .or_else(|| section_from_refresh(rules, &low))
}

/// Section implied by the object's `type` field.
pub fn section_from_type(rules: &Rules, obj: &Value) -> Option<Section> {
    let kind = obj.get("type").and_then(Value::as_str)?;
    rules
        .section_types
        .iter()
        .find(|(name, _)| name == kind)
        .map(|(_, section)| *section)
}

/// Classifies a line: text rules against each text in order, then the
/// `type` field fallback.
pub fn classify_section(rules: &Rules, obj: &Value, texts: &[&str]) -> Option<Section> {
    texts
        .iter()
        .find_map(|text| classify_text(rules, text))
        .or_else(|| section_from_type(rules, obj))
}
