//! Storage abstraction for the log harness.
//!
//! The [`Store`] trait defines every operation the ingestor, the query
//! engine and the command layer need, so they can run against any backend.
//! [`SqliteStore`](crate::sqlite_store::SqliteStore) is the durable one.
//!
//! Implementations must be `Send + Sync` so one store can be shared by
//! concurrent ingest and query tasks.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`insert_log`](Store::insert_log) | Append a log record, returning its id |
//! | [`insert_json_body`](Store::insert_json_body) | Attach a body to an existing record |
//! | [`insert_entry`](Store::insert_entry) | Append a record and its bodies atomically |
//! | [`get_log`](Store::get_log) | Fetch one record by id |
//! | [`get_json_bodies_for_log`](Store::get_json_bodies_for_log) | Bodies of a record, in insertion order |
//! | [`search`](Store::search) | Filtered search, newest first |
//! | [`mark_read`](Store::mark_read) | Set the read flag on a batch of ids |
//! | [`get_sections_summary`](Store::get_sections_summary) | Per-section counts and time span |
//! | [`level_counts`](Store::level_counts) | Rows per level |

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{
    JsonBody, LevelCount, LogRecord, NewJsonBody, NewLogRecord, SearchFilters, SectionSummary,
};

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_log(&self, record: &NewLogRecord) -> StoreResult<i64>;

    async fn insert_json_body(&self, log_id: i64, body_type: &str, body_json: &str)
        -> StoreResult<()>;

    /// Append a record and all of its bodies as one unit. Readers see
    /// either nothing or the record with every body.
    async fn insert_entry(&self, record: &NewLogRecord, bodies: &[NewJsonBody])
        -> StoreResult<i64>;

    async fn get_log(&self, id: i64) -> StoreResult<Option<LogRecord>>;

    async fn get_json_bodies_for_log(&self, log_id: i64) -> StoreResult<Vec<JsonBody>>;

    async fn search(&self, filters: &SearchFilters) -> StoreResult<Vec<LogRecord>>;

    /// Flip `read_flag` to true for the given ids. An empty list is a no-op.
    async fn mark_read(&self, ids: &[i64]) -> StoreResult<()>;

    /// Rows with a section, grouped by section, ordered by earliest `ts`.
    async fn get_sections_summary(&self) -> StoreResult<Vec<SectionSummary>>;

    async fn level_counts(&self) -> StoreResult<Vec<LevelCount>>;

    async fn count_logs(&self) -> StoreResult<i64>;

    async fn count_unread(&self) -> StoreResult<i64>;
}
