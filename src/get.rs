//! Record retrieval by ID.
//!
//! Fetches one log record and its embedded bodies. Used by the
//! `tflog get` command and by embedding callers that render a detail view.

use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::models::{JsonBody, LogRecord};
use crate::sqlite_store::SqliteStore;
use crate::store::Store;

/// A record together with its bodies, in insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct LogDetail {
    #[serde(flatten)]
    pub record: LogRecord,
    pub bodies: Vec<JsonBody>,
}

pub async fn get_log_detail<S>(store: &S, id: i64) -> StoreResult<LogDetail>
where
    S: Store + ?Sized,
{
    let record = store
        .get_log(id)
        .await?
        .ok_or_else(|| StoreError::not_found(id))?;
    let bodies = store.get_json_bodies_for_log(id).await?;

    Ok(LogDetail { record, bodies })
}

/// CLI entry point: prints the record and its bodies.
pub async fn run_get(config: &Config, id: i64, as_json: bool) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let detail = get_log_detail(&store, id).await;
    store.close().await;
    let detail = detail?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let record = &detail.record;
    println!("--- Log ---");
    println!("id:           {}", record.id);
    println!("ts:           {}", record.ts.as_deref().unwrap_or("-"));
    println!(
        "level:        {}",
        record.level.map(|l| l.as_str()).unwrap_or("-")
    );
    println!(
        "section:      {}",
        record.section.map(|s| s.as_str()).unwrap_or("-")
    );
    println!(
        "tf_resource:  {}",
        record.tf_resource.as_deref().unwrap_or("-")
    );
    println!("tf_req_id:    {}", record.tf_req_id.as_deref().unwrap_or("-"));
    println!("read:         {}", record.read_flag);
    println!();

    println!("--- Raw ---");
    println!("{}", record.raw_json);
    println!();

    println!("--- Bodies ({}) ---", detail.bodies.len());
    for body in &detail.bodies {
        println!("[{}]", body.body_type);
        match serde_json::from_str::<serde_json::Value>(&body.body_json) {
            Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            Err(_) => println!("{}", body.body_json),
        }
        println!();
    }

    Ok(())
}
