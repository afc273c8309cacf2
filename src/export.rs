//! Export matching records as JSON Lines.
//!
//! Writes the stored `raw_json` of every record matching the filters, one
//! per line, so the output can be fed back into `tflog ingest` or any
//! other JSONL consumer.

use anyhow::Result;
use std::io::Write;
use std::path::Path;

use crate::config::Config;
use crate::error::StoreResult;
use crate::models::SearchFilters;
use crate::sqlite_store::SqliteStore;
use crate::store::Store;

/// Writes matching records to `out`. Returns the number of lines written.
pub async fn export_jsonl<S, W>(store: &S, filters: &SearchFilters, out: &mut W) -> StoreResult<usize>
where
    S: Store + ?Sized,
    W: Write,
{
    let records = store.search(filters).await?;
    for record in &records {
        writeln!(out, "{}", record.raw_json)?;
    }
    out.flush()?;
    Ok(records.len())
}

/// If `output` is `Some`, writes to that file path. Otherwise writes to
/// stdout for piping.
pub async fn run_export(
    config: &Config,
    mut filters: SearchFilters,
    output: Option<&Path>,
) -> Result<()> {
    if filters.limit.is_none() {
        filters.limit = Some(config.search.export_limit);
    }

    let store = SqliteStore::open(config).await?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
            let count = export_jsonl(&store, &filters, &mut file).await?;
            eprintln!("Exported {} records to {}", count, path.display());
        }
        None => {
            let mut stdout = std::io::stdout();
            export_jsonl(&store, &filters, &mut stdout).await?;
        }
    }

    store.close().await;
    Ok(())
}
