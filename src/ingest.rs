//! Ingestion pipeline orchestration.
//!
//! Turns raw log lines into stored records: decode → extract fields →
//! classify section → pull out embedded bodies → write record and bodies
//! together. Parsing is total: a line that is not JSON is wrapped as
//! `{"raw": <line>}`, and every non-blank line yields exactly one record.
//! Only storage failures reach the caller.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::bodies::{extract_bodies, prepare_bodies};
use crate::config::Config;
use crate::error::StoreResult;
use crate::extract::{
    extract_request_id, extract_resource, extract_timestamp, guess_level, level_from_fields,
    timestamp_from_fields,
};
use crate::models::{BodyValue, NewLogRecord};
use crate::rules::Rules;
use crate::section::classify_section;
use crate::sqlite_store::SqliteStore;
use crate::store::Store;

/// Maximum excerpt length, in characters, before the ellipsis.
pub const EXCERPT_MAX_CHARS: usize = 400;

/// A line after extraction, before it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// The decoded line, or the `{"raw": ...}` wrapper.
    pub value: Value,
    pub record: NewLogRecord,
    pub bodies: Vec<(String, BodyValue)>,
}

/// Truncates to `max_chars` characters, appending `...` only when cut.
pub fn make_excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Decodes a line, substituting the raw wrapper when it is not JSON.
pub fn decode_line(line: &str) -> Value {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "line is not JSON, wrapping as raw");
            json!({ "raw": line })
        }
    }
}

/// Runs every extractor over one line. Returns `None` for blank lines.
pub fn parse_line(rules: &Rules, line: &str) -> Option<ParsedLine> {
    if line.trim().is_empty() {
        return None;
    }

    let value = decode_line(line);
    let text = serde_json::to_string(&value).unwrap_or_else(|_| line.to_string());

    let ts = timestamp_from_fields(rules, &value)
        .or_else(|| extract_timestamp(rules, &text))
        .or_else(|| extract_timestamp(rules, line));
    let level = level_from_fields(rules, &value)
        .or_else(|| guess_level(rules, &text))
        .or_else(|| guess_level(rules, line));
    let section = classify_section(rules, &value, &[&text, line]);
    let tf_req_id = extract_request_id(rules, &value, &text)
        .or_else(|| extract_request_id(rules, &value, line));
    let tf_resource = extract_resource(rules, &value);
    let bodies = extract_bodies(rules, &value);
    let text_excerpt = make_excerpt(&text, EXCERPT_MAX_CHARS);

    let record = NewLogRecord {
        raw_json: text,
        ts,
        level,
        tf_req_id,
        tf_resource,
        section,
        text_excerpt,
    };

    Some(ParsedLine {
        value,
        record,
        bodies,
    })
}

/// Parses and stores each non-blank line. Returns the number of records
/// inserted.
pub async fn ingest_lines<S, I, L>(store: &S, rules: &Rules, lines: I) -> StoreResult<usize>
where
    S: Store + ?Sized,
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    let mut inserted = 0usize;

    for line in lines {
        let Some(parsed) = parse_line(rules, line.as_ref()) else {
            continue;
        };
        let bodies = prepare_bodies(&parsed.bodies);
        let id = store.insert_entry(&parsed.record, &bodies).await?;

        tracing::debug!(
            id,
            level = ?parsed.record.level,
            section = ?parsed.record.section,
            bodies = bodies.len(),
            "ingested line"
        );
        inserted += 1;
    }

    Ok(inserted)
}

/// Splits on every line boundary a log file may use: `\n`, `\r\n`, a lone
/// `\r`, and the Unicode line and paragraph separators. The empty piece
/// between `\r` and `\n` is blank and skipped on ingest.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| {
        matches!(
            c,
            '\n' | '\r'
                | '\u{0b}'
                | '\u{0c}'
                | '\u{1c}'
                | '\u{1d}'
                | '\u{1e}'
                | '\u{85}'
                | '\u{2028}'
                | '\u{2029}'
        )
    })
}

/// Splits `text` into lines and ingests them.
pub async fn ingest_text<S>(store: &S, rules: &Rules, text: &str) -> StoreResult<usize>
where
    S: Store + ?Sized,
{
    ingest_lines(store, rules, split_lines(text)).await
}

/// Reads a file leniently (invalid UTF-8 is replaced) and ingests it.
pub async fn ingest_file<S>(store: &S, rules: &Rules, path: &Path) -> Result<usize>
where
    S: Store + ?Sized,
{
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let inserted = ingest_text(store, rules, &text).await?;

    tracing::info!(path = %path.display(), inserted, "ingested file");
    Ok(inserted)
}

/// Files under `root` matching the configured include globs and not the
/// exclude globs, sorted. A file path is returned as-is.
pub fn collect_log_files(config: &Config, root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("Path does not exist: {}", root.display());
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let include_set = build_globset(&config.ingest.include_globs)?;

    let mut default_excludes = vec!["**/.git/**".to_string(), "**/.terraform/**".to_string()];
    default_excludes.extend(config.ingest.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().to_string();

        if exclude_set.is_match(&rel_str) || !include_set.is_match(&rel_str) {
            continue;
        }
        files.push(path.to_path_buf());
    }

    // Sort for deterministic ordering
    files.sort();
    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

pub async fn run_ingest(config: &Config, path: &Path) -> Result<()> {
    let files = collect_log_files(config, path)?;
    let store = SqliteStore::open(config).await?;
    let rules = Rules::terraform();

    println!("ingest {}", path.display());
    let mut total = 0usize;
    for file in &files {
        let inserted = ingest_file(&store, rules, file).await?;
        println!("  {}: {} records", file.display(), inserted);
        total += inserted;
    }
    println!("  files: {}", files.len());
    println!("  inserted: {}", total);
    println!("ok");

    store.close().await;
    Ok(())
}
