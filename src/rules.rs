//! Extraction rule tables.
//!
//! Every heuristic in the extractors reads its precedence from a [`Rules`]
//! value: field-name priority lists, level aliases and keyword buckets,
//! timestamp and request-id patterns, section phrases, and body-carrying
//! field names. Order within each list is significant: the first entry
//! that matches wins.
//!
//! [`Rules::terraform`] returns the built-in table, compiled once.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{Level, Section};

/// Ordered extraction rules shared by all extractors.
#[derive(Debug, Clone)]
pub struct Rules {
    /// Timestamp patterns, highest priority first. Each must have a `ts` group.
    pub timestamp_patterns: Vec<Regex>,
    /// Object keys holding an explicit timestamp.
    pub timestamp_fields: Vec<String>,
    /// Object keys holding an explicit level.
    pub level_fields: Vec<String>,
    /// Literal level spellings (lowercase) mapped onto canonical levels.
    pub level_aliases: Vec<(Level, Vec<String>)>,
    /// Keyword buckets for free-text level guessing, highest priority first.
    pub level_keywords: Vec<(Level, Vec<String>)>,
    /// Object keys holding a resource identifier.
    pub resource_fields: Vec<String>,
    /// Object keys holding a request id.
    pub request_id_fields: Vec<String>,
    /// Free-text request-id patterns; capture group 1 is the id.
    pub request_id_patterns: Vec<Regex>,
    /// Explicit phrases naming a phase, checked in order.
    pub section_phrases: Vec<(Section, Vec<String>)>,
    pub section_start_verbs: Vec<String>,
    pub section_end_verbs: Vec<String>,
    /// Words that make a start/end verb count as a phase boundary.
    pub section_phase_words: Vec<String>,
    pub refresh_phrases: Vec<String>,
    /// Values of the object's `type` field mapped onto sections.
    pub section_types: Vec<(String, Section)>,
    /// Fields that may carry an embedded JSON body, in output order.
    pub body_fields: Vec<String>,
}

static TERRAFORM_RULES: LazyLock<Rules> = LazyLock::new(Rules::build_terraform);

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("built-in extraction pattern must compile")
}

impl Rules {
    /// The built-in rule table for Terraform core and provider logs.
    pub fn terraform() -> &'static Rules {
        &TERRAFORM_RULES
    }

    fn build_terraform() -> Rules {
        Rules {
            timestamp_patterns: vec![
                pattern(r"(?P<ts>\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d+Z)"),
                pattern(r"(?P<ts>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})"),
                pattern(r"(?P<ts>\d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2})"),
            ],
            timestamp_fields: strings(&["timestamp", "@timestamp"]),
            level_fields: strings(&["level", "@level", "log_level", "lvl"]),
            level_aliases: vec![
                (
                    Level::Error,
                    strings(&["error", "err", "fatal", "critical", "crit"]),
                ),
                (Level::Warning, strings(&["warning", "warn"])),
                (Level::Info, strings(&["info", "information", "notice"])),
                (Level::Debug, strings(&["debug", "dbg", "trace"])),
            ],
            level_keywords: vec![
                (
                    Level::Error,
                    strings(&[
                        "error",
                        "failed",
                        "panic",
                        "exception",
                        "traceback",
                        "failure",
                    ]),
                ),
                (
                    Level::Warning,
                    strings(&["warning", "deprecated", "deprecation", "warn"]),
                ),
                (
                    Level::Info,
                    strings(&[
                        "info", "notice", "started", "complete", "success", "begin", "end",
                    ]),
                ),
                (Level::Debug, strings(&["debug", "verbose", "trace"])),
            ],
            resource_fields: strings(&[
                "tf_resource",
                "resource",
                "tf_resource_type",
                "type",
                "resource_type",
            ]),
            request_id_fields: strings(&[
                "tf_req_id",
                "req_id",
                "request_id",
                "tf_request_id",
                "correlation_id",
            ]),
            request_id_patterns: vec![
                pattern(r#"tf_req_id\s*[=:]\s*"?([A-Za-z0-9_\-:.]+)"#),
                pattern(r#"request_id\s*[=:]\s*"?([A-Za-z0-9_\-:.]+)"#),
            ],
            section_phrases: vec![
                (
                    Section::Plan,
                    strings(&["terraform plan", "plan:", "plan operation"]),
                ),
                (
                    Section::Apply,
                    strings(&["terraform apply", "apply:", "apply operation"]),
                ),
            ],
            section_start_verbs: strings(&["starting", "begin"]),
            section_end_verbs: strings(&["completed", "finished", "end"]),
            section_phase_words: strings(&["plan", "apply"]),
            refresh_phrases: strings(&["refreshing state"]),
            section_types: vec![
                ("change_summary".to_string(), Section::PlanSummary),
                ("apply".to_string(), Section::ApplySummary),
            ],
            body_fields: strings(&[
                "tf_http_req_body",
                "tf_http_res_body",
                "http_request_body",
                "http_response_body",
                "request_body",
                "response_body",
            ]),
        }
    }
}
