//! `--mode Full-load`: rebuild the warehouse from scratch.

use crate::config::Config;

use super::{connect_source, open_warehouse, print_report, print_watermarks, CommandError};

pub async fn run_full_load(config: &Config) -> Result<(), CommandError> {
    let source = connect_source(config).await?;
    let warehouse = open_warehouse(config).await?;

    println!("Running full load...");
    println!();

    let report = starsync_core::run_full_load(&warehouse, &source).await?;
    print_report(&report);
    print_watermarks(&warehouse).await?;

    println!();
    println!("Full load complete.");
    Ok(())
}
