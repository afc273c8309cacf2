//! Core data models used throughout the log harness.
//!
//! These types represent the log records, embedded bodies, filters and
//! aggregates that flow between ingestion, storage and query.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalized severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warning,
    Info,
    Debug,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Level::Error),
            "warning" => Ok(Level::Warning),
            "info" => Ok(Level::Info),
            "debug" => Ok(Level::Debug),
            other => Err(format!(
                "unknown level '{}'. Use error, warning, info, or debug.",
                other
            )),
        }
    }
}

/// Coarse execution phase attached to a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Plan,
    Apply,
    Start,
    End,
    Refresh,
    PlanSummary,
    ApplySummary,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Plan => "plan",
            Section::Apply => "apply",
            Section::Start => "start",
            Section::End => "end",
            Section::Refresh => "refresh",
            Section::PlanSummary => "plan_summary",
            Section::ApplySummary => "apply_summary",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plan" => Ok(Section::Plan),
            "apply" => Ok(Section::Apply),
            "start" => Ok(Section::Start),
            "end" => Ok(Section::End),
            "refresh" => Ok(Section::Refresh),
            "plan_summary" => Ok(Section::PlanSummary),
            "apply_summary" => Ok(Section::ApplySummary),
            other => Err(format!(
                "unknown section '{}'. Use plan, apply, start, end, refresh, plan_summary, or apply_summary.",
                other
            )),
        }
    }
}

/// A log record ready to be written. The store assigns the id and the
/// read flag starts out false.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewLogRecord {
    pub raw_json: String,
    pub ts: Option<String>,
    pub level: Option<Level>,
    pub tf_req_id: Option<String>,
    pub tf_resource: Option<String>,
    pub section: Option<Section>,
    pub text_excerpt: String,
}

/// One stored row of the `logs` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub id: i64,
    pub raw_json: String,
    pub ts: Option<String>,
    pub level: Option<Level>,
    pub tf_req_id: Option<String>,
    pub tf_resource: Option<String>,
    pub section: Option<Section>,
    pub text_excerpt: String,
    pub read_flag: bool,
}

/// One stored row of the `json_bodies` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonBody {
    pub id: i64,
    pub body_type: String,
    pub body_json: String,
}

/// A body payload pulled out of a line, before it is written.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyValue {
    /// Decoded (or already structured) JSON.
    Json(serde_json::Value),
    /// Text that could not be decoded, kept verbatim.
    Raw(String),
}

/// A body ready to be written alongside its parent record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJsonBody {
    pub body_type: String,
    pub body_json: String,
}

/// Filters accepted by the query engine. Every set field narrows the
/// result (AND semantics).
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// Substring match against `raw_json` or `text_excerpt`.
    pub q: Option<String>,
    pub level: Option<Level>,
    /// Substring match against `tf_resource`.
    pub resource: Option<String>,
    pub tf_req_id: Option<String>,
    /// Inclusive lower bound on `ts`, compared lexically.
    pub ts_from: Option<String>,
    /// Inclusive upper bound on `ts`, compared lexically.
    pub ts_to: Option<String>,
    pub section: Option<Section>,
    pub unread_only: bool,
    pub limit: Option<i64>,
}

/// Per-section aggregate returned by the sections summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub section: Section,
    pub count: i64,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Row count per level. `level` is `None` for unclassified rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCount {
    pub level: Option<Level>,
    pub count: i64,
}
