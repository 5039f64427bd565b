//! `--mode Validate`: compare source and warehouse counts and totals.

use starsync_core::ValidationReport;

use crate::config::Config;

use super::{connect_source, open_warehouse, CommandError};

pub async fn run_validate(config: &Config) -> Result<(), CommandError> {
    let source = connect_source(config).await?;
    let warehouse = open_warehouse(config).await?;

    let report = starsync_core::validate(&warehouse, &source).await?;
    print_validation(&report);
    Ok(())
}

fn print_validation(report: &ValidationReport) {
    for check in &report.tables {
        println!(
            "  {} {:<14} {:>8} → {:<20} {:>8}",
            if check.passed() { "✓" } else { "✗" },
            check.source.name(),
            check.source_count,
            check.warehouse.name(),
            check.warehouse_count
        );
    }
    println!(
        "  {} {:<14} {:>8.2} → {:<20} {:>8.2}",
        if report.amount.passed() { "✓" } else { "✗" },
        "payment.amount",
        report.amount.source_total,
        "fact_payment.amount",
        report.amount.warehouse_total
    );
    println!();

    if report.passed() {
        println!("Validation passed.");
        return;
    }

    println!("Validation failed.");
    let failed = report.failed_tables();
    if !failed.is_empty() {
        println!("  Count mismatch: {}", failed.join(", "));
    }
    if !report.amount.passed() {
        println!(
            "  Amount mismatch: source {:.2}, warehouse {:.2}",
            report.amount.source_total, report.amount.warehouse_total
        );
    }
}
