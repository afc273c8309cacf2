//! SQLite-backed [`Store`] implementation.
//!
//! Maps each [`Store`] operation onto the `logs` / `json_bodies` schema
//! created by [`migrate::ensure_schema`](crate::migrate::ensure_schema).

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::error::StoreResult;
use crate::migrate;
use crate::models::{
    JsonBody, LevelCount, LogRecord, NewJsonBody, NewLogRecord, SearchFilters, SectionSummary,
};
use crate::search;
use crate::store::Store;

const INSERT_LOG_SQL: &str = "INSERT INTO logs (raw_json, ts, level, tf_req_id, tf_resource, section, text_excerpt) \
     VALUES (?, ?, ?, ?, ?, ?, ?)";

const INSERT_BODY_SQL: &str =
    "INSERT INTO json_bodies (log_id, body_type, body_json) VALUES (?, ?, ?)";

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to the configured database and makes sure the schema exists.
    pub async fn open(config: &Config) -> StoreResult<Self> {
        let pool = db::connect(config).await?;
        migrate::ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

pub(crate) fn row_to_record(row: &SqliteRow) -> LogRecord {
    let level: Option<String> = row.get("level");
    let section: Option<String> = row.get("section");
    let read_flag: i64 = row.get("read_flag");

    LogRecord {
        id: row.get("id"),
        raw_json: row.get("raw_json"),
        ts: row.get("ts"),
        level: level.and_then(|s| s.parse().ok()),
        tf_req_id: row.get("tf_req_id"),
        tf_resource: row.get("tf_resource"),
        section: section.and_then(|s| s.parse().ok()),
        text_excerpt: row.get("text_excerpt"),
        read_flag: read_flag != 0,
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_log(&self, record: &NewLogRecord) -> StoreResult<i64> {
        let result = sqlx::query(INSERT_LOG_SQL)
            .bind(&record.raw_json)
            .bind(&record.ts)
            .bind(record.level.map(|l| l.as_str()))
            .bind(&record.tf_req_id)
            .bind(&record.tf_resource)
            .bind(record.section.map(|s| s.as_str()))
            .bind(&record.text_excerpt)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_json_body(
        &self,
        log_id: i64,
        body_type: &str,
        body_json: &str,
    ) -> StoreResult<()> {
        sqlx::query(INSERT_BODY_SQL)
            .bind(log_id)
            .bind(body_type)
            .bind(body_json)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn insert_entry(
        &self,
        record: &NewLogRecord,
        bodies: &[NewJsonBody],
    ) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(INSERT_LOG_SQL)
            .bind(&record.raw_json)
            .bind(&record.ts)
            .bind(record.level.map(|l| l.as_str()))
            .bind(&record.tf_req_id)
            .bind(&record.tf_resource)
            .bind(record.section.map(|s| s.as_str()))
            .bind(&record.text_excerpt)
            .execute(&mut *tx)
            .await?;
        let log_id = result.last_insert_rowid();

        for body in bodies {
            sqlx::query(INSERT_BODY_SQL)
                .bind(log_id)
                .bind(&body.body_type)
                .bind(&body.body_json)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(log_id)
    }

    async fn get_log(&self, id: i64) -> StoreResult<Option<LogRecord>> {
        let row = sqlx::query(
            "SELECT id, raw_json, ts, level, tf_req_id, tf_resource, section, text_excerpt, read_flag \
             FROM logs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_record))
    }

    async fn get_json_bodies_for_log(&self, log_id: i64) -> StoreResult<Vec<JsonBody>> {
        let rows = sqlx::query(
            "SELECT id, body_type, body_json FROM json_bodies WHERE log_id = ? ORDER BY id ASC",
        )
        .bind(log_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| JsonBody {
                id: row.get("id"),
                body_type: row.get("body_type"),
                body_json: row.get("body_json"),
            })
            .collect())
    }

    async fn search(&self, filters: &SearchFilters) -> StoreResult<Vec<LogRecord>> {
        let limit = filters.limit.unwrap_or(search::DEFAULT_SEARCH_LIMIT);
        let mut qb = search::build_search_query(filters, limit);
        let rows = qb.build().fetch_all(&self.pool).await?;

        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn mark_read(&self, ids: &[i64]) -> StoreResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE logs SET read_flag = 1 WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn get_sections_summary(&self) -> StoreResult<Vec<SectionSummary>> {
        // MIN/MAX over ts are string comparisons, meaningful only when every
        // timestamp shares one format.
        let rows = sqlx::query(
            r#"
            SELECT section, COUNT(*) AS count, MIN(ts) AS start_time, MAX(ts) AS end_time
            FROM logs
            WHERE section IS NOT NULL
            GROUP BY section
            ORDER BY start_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let section: String = row.get("section");
                Some(SectionSummary {
                    section: section.parse().ok()?,
                    count: row.get("count"),
                    start_time: row.get("start_time"),
                    end_time: row.get("end_time"),
                })
            })
            .collect())
    }

    async fn level_counts(&self) -> StoreResult<Vec<LevelCount>> {
        let rows = sqlx::query(
            "SELECT level, COUNT(*) AS count FROM logs GROUP BY level ORDER BY count DESC, level ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let level: Option<String> = row.get("level");
                LevelCount {
                    level: level.and_then(|s| s.parse().ok()),
                    count: row.get("count"),
                }
            })
            .collect())
    }

    async fn count_logs(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_unread(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM logs WHERE read_flag = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
