use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::error::StoreResult;

/// Creates the `logs` and `json_bodies` tables and their indexes.
/// Idempotent.
pub async fn ensure_schema(pool: &SqlitePool) -> StoreResult<()> {
    // AUTOINCREMENT keeps ids monotonic and never reused
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS logs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            raw_json TEXT NOT NULL,
            ts TEXT,
            level TEXT,
            tf_req_id TEXT,
            tf_resource TEXT,
            section TEXT,
            text_excerpt TEXT NOT NULL DEFAULT '',
            read_flag INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS json_bodies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            log_id INTEGER NOT NULL,
            body_type TEXT NOT NULL,
            body_json TEXT NOT NULL,
            FOREIGN KEY (log_id) REFERENCES logs(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_logs_tf_req_id ON logs(tf_req_id)",
        "CREATE INDEX IF NOT EXISTS idx_logs_ts ON logs(ts)",
        "CREATE INDEX IF NOT EXISTS idx_logs_level ON logs(level)",
        "CREATE INDEX IF NOT EXISTS idx_logs_tf_resource ON logs(tf_resource)",
        "CREATE INDEX IF NOT EXISTS idx_logs_section ON logs(section)",
        "CREATE INDEX IF NOT EXISTS idx_json_bodies_log_id ON json_bodies(log_id)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    ensure_schema(&pool).await?;
    pool.close().await;
    Ok(())
}
