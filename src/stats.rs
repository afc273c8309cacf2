//! Database statistics and phase overview.
//!
//! `tflog stats` gives a quick picture of what is indexed: record and
//! unread counts, the level distribution, and the per-section summary.
//! `tflog sections` prints just the section summary.

use anyhow::Result;

use crate::config::Config;
use crate::models::SectionSummary;
use crate::sqlite_store::SqliteStore;
use crate::store::Store;

pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;

    let total = store.count_logs().await?;
    let unread = store.count_unread().await?;
    let levels = store.level_counts().await?;
    let sections = store.get_sections_summary().await?;
    store.close().await;

    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    println!("Terraform Log Harness — Database Stats");
    println!("======================================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!();
    println!("  Records:     {}", total);
    println!("  Unread:      {}", unread);

    if !levels.is_empty() {
        println!();
        println!("  By level:");
        for entry in &levels {
            let name = entry.level.map(|l| l.as_str()).unwrap_or("unknown");
            println!("  {:<10} {:>8}", name, entry.count);
        }
    }

    if !sections.is_empty() {
        println!();
        println!("  By section:");
        print_sections(&sections);
    }

    println!();
    Ok(())
}

pub async fn run_sections(config: &Config, as_json: bool) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let sections = store.get_sections_summary().await?;
    store.close().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
    } else if sections.is_empty() {
        println!("No sections.");
    } else {
        print_sections(&sections);
    }
    Ok(())
}

fn print_sections(sections: &[SectionSummary]) {
    println!(
        "  {:<14} {:>6}   {:<26} {}",
        "SECTION", "COUNT", "START", "END"
    );
    println!("  {}", "-".repeat(76));
    for s in sections {
        println!(
            "  {:<14} {:>6}   {:<26} {}",
            s.section.as_str(),
            s.count,
            s.start_time.as_deref().unwrap_or("-"),
            s.end_time.as_deref().unwrap_or("-"),
        );
    }
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
