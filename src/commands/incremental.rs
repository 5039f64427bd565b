//! `--mode Incremental`: sync rows changed since the last run.

use crate::config::Config;

use super::{connect_source, open_warehouse, print_report, print_watermarks, CommandError};

pub async fn run_incremental(config: &Config) -> Result<(), CommandError> {
    let source = connect_source(config).await?;
    let warehouse = open_warehouse(config).await?;

    println!("Syncing from {}...", config.source.database);
    println!();

    let report = starsync_core::run_incremental(&warehouse, &source).await?;
    print_report(&report);
    print_watermarks(&warehouse).await?;

    println!();
    if report.tables.iter().any(|t| t.advanced) {
        println!("Sync complete.");
    } else {
        println!("Already up to date.");
    }
    Ok(())
}
