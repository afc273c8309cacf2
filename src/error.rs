//! Structured error types for the storage layer.
//!
//! Parsing and classification never fail; only infrastructure does.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("log not found: {log_id}")]
    NotFound { log_id: i64 },
}

impl StoreError {
    pub fn not_found(log_id: i64) -> Self {
        Self::NotFound { log_id }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
