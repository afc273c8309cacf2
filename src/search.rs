//! Query engine over stored log records.
//!
//! Builds the filtered `logs` query shared by search and export, and
//! implements the `tflog search` and `tflog mark-read` commands.
//!
//! Filters combine with AND. Free text and resource are case-insensitive
//! substring matches; level, request id and section are exact; the `ts`
//! range compares strings. Results come back newest `ts` first with
//! undated rows last.

use anyhow::Result;
use sqlx::{QueryBuilder, Sqlite};

use crate::config::Config;
use crate::models::{LogRecord, SearchFilters};
use crate::sqlite_store::SqliteStore;
use crate::store::Store;

pub const DEFAULT_SEARCH_LIMIT: i64 = 500;

const SELECT_LOGS: &str =
    "SELECT id, raw_json, ts, level, tf_req_id, tf_resource, section, text_excerpt, read_flag FROM logs";

/// `%needle%` with LIKE wildcards in the needle escaped.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Builds the filtered, ordered, limited `SELECT` over `logs`. A limit
/// below 1 is raised to 1; SQLite reads a negative `LIMIT` as unbounded.
pub fn build_search_query(filters: &SearchFilters, limit: i64) -> QueryBuilder<'static, Sqlite> {
    let mut qb: QueryBuilder<'static, Sqlite> = QueryBuilder::new(SELECT_LOGS);
    let mut first = true;
    let mut and = |qb: &mut QueryBuilder<'static, Sqlite>| {
        qb.push(if first { " WHERE " } else { " AND " });
        first = false;
    };

    if let Some(q) = filters.q.as_deref().filter(|q| !q.is_empty()) {
        let pattern = like_pattern(q);
        and(&mut qb);
        qb.push("(raw_json LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR text_excerpt LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
    if let Some(level) = filters.level {
        and(&mut qb);
        qb.push("level = ").push_bind(level.as_str());
    }
    if let Some(resource) = filters.resource.as_deref().filter(|r| !r.is_empty()) {
        and(&mut qb);
        qb.push("tf_resource LIKE ")
            .push_bind(like_pattern(resource))
            .push(" ESCAPE '\\'");
    }
    if let Some(req_id) = filters.tf_req_id.as_deref().filter(|r| !r.is_empty()) {
        and(&mut qb);
        qb.push("tf_req_id = ").push_bind(req_id.to_string());
    }
    if let Some(from) = filters.ts_from.as_deref().filter(|t| !t.is_empty()) {
        and(&mut qb);
        qb.push("ts >= ").push_bind(from.to_string());
    }
    if let Some(to) = filters.ts_to.as_deref().filter(|t| !t.is_empty()) {
        and(&mut qb);
        qb.push("ts <= ").push_bind(to.to_string());
    }
    if let Some(section) = filters.section {
        and(&mut qb);
        qb.push("section = ").push_bind(section.as_str());
    }
    if filters.unread_only {
        and(&mut qb);
        qb.push("read_flag = 0");
    }

    qb.push(" ORDER BY ts IS NULL, ts DESC, id DESC LIMIT ")
        .push_bind(limit.max(1));
    qb
}

pub async fn run_search(config: &Config, mut filters: SearchFilters, as_json: bool) -> Result<()> {
    if filters.limit.is_none() {
        filters.limit = Some(config.search.default_limit);
    }

    let store = SqliteStore::open(config).await?;
    let results = store.search(&filters).await?;
    store.close().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for record in &results {
        print_record_line(record);
    }
    println!();
    println!("{} result(s)", results.len());

    Ok(())
}

fn print_record_line(record: &LogRecord) {
    let read_marker = if record.read_flag { " " } else { "*" };
    println!(
        "{}{:>6}  {:<24}  {:<7}  {:<13}  {}",
        read_marker,
        record.id,
        record.ts.as_deref().unwrap_or("-"),
        record.level.map(|l| l.as_str()).unwrap_or("-"),
        record.section.map(|s| s.as_str()).unwrap_or("-"),
        record.tf_resource.as_deref().unwrap_or("-"),
    );
    if let Some(ref req_id) = record.tf_req_id {
        println!("         req: {}", req_id);
    }
    println!(
        "         {}",
        record.text_excerpt.replace('\n', " ").trim()
    );
}

pub async fn run_mark_read(config: &Config, ids: &[i64]) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    store.mark_read(ids).await?;
    store.close().await;

    println!("marked {} record(s) read", ids.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Level, Section};

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("aws_s3"), "%aws\\_s3%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }

    #[test]
    fn test_no_filters_has_no_where() {
        let qb = build_search_query(&SearchFilters::default(), 10);
        let sql = qb.sql();
        assert!(!sql.contains("WHERE"));
        assert!(sql.ends_with("ORDER BY ts IS NULL, ts DESC, id DESC LIMIT ?"));
    }

    #[test]
    fn test_filters_joined_with_and() {
        let filters = SearchFilters {
            q: Some("bucket".to_string()),
            level: Some(Level::Error),
            section: Some(Section::Apply),
            unread_only: true,
            ..Default::default()
        };
        let qb = build_search_query(&filters, 10);
        let sql = qb.sql();
        assert!(sql.contains(" WHERE (raw_json LIKE ?"));
        assert!(sql.contains(" AND level = ?"));
        assert!(sql.contains(" AND section = ?"));
        assert!(sql.contains(" AND read_flag = 0"));
        assert_eq!(sql.matches("WHERE").count(), 1);
    }

    #[test]
    fn test_empty_strings_ignored() {
        let filters = SearchFilters {
            q: Some(String::new()),
            resource: Some(String::new()),
            ..Default::default()
        };
        let qb = build_search_query(&filters, 10);
        assert!(!qb.sql().contains("WHERE"));
    }
}
