//! Post-sync consistency checks between the source and the warehouse.
//!
//! Checks are read-only. A mismatch is reported, never repaired.

use crate::error::Result;
use crate::source::{SourceStore, SourceTable};
use crate::warehouse::{Warehouse, WarehouseTable};

/// Source tables and the warehouse tables that should mirror them row for row.
pub const TABLE_PAIRS: [(SourceTable, WarehouseTable); 9] = [
    (SourceTable::Film, WarehouseTable::DimFilm),
    (SourceTable::Actor, WarehouseTable::DimActor),
    (SourceTable::Category, WarehouseTable::DimCategory),
    (SourceTable::Store, WarehouseTable::DimStore),
    (SourceTable::Customer, WarehouseTable::DimCustomer),
    (SourceTable::FilmActor, WarehouseTable::BridgeFilmActor),
    (SourceTable::FilmCategory, WarehouseTable::BridgeFilmCategory),
    (SourceTable::Rental, WarehouseTable::FactRental),
    (SourceTable::Payment, WarehouseTable::FactPayment),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCheck {
    pub source: SourceTable,
    pub warehouse: WarehouseTable,
    pub source_count: i64,
    pub warehouse_count: i64,
}

impl TableCheck {
    pub fn passed(&self) -> bool {
        self.source_count == self.warehouse_count
    }
}

/// Payment totals on both sides. An empty table totals zero.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountCheck {
    pub source_total: f64,
    pub warehouse_total: f64,
}

impl AmountCheck {
    /// Equal when both totals round to the same number of cents.
    pub fn passed(&self) -> bool {
        to_cents(self.source_total) == to_cents(self.warehouse_total)
    }
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub tables: Vec<TableCheck>,
    pub amount: AmountCheck,
}

impl ValidationReport {
    /// Source names of the tables whose counts differ.
    pub fn failed_tables(&self) -> Vec<&'static str> {
        self.tables
            .iter()
            .filter(|check| !check.passed())
            .map(|check| check.source.name())
            .collect()
    }

    pub fn passed(&self) -> bool {
        self.failed_tables().is_empty() && self.amount.passed()
    }
}

pub async fn validate_counts(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
) -> Result<Vec<TableCheck>> {
    let mut checks = Vec::with_capacity(TABLE_PAIRS.len());
    for (source_table, warehouse_table) in TABLE_PAIRS {
        let check = TableCheck {
            source: source_table,
            warehouse: warehouse_table,
            source_count: source.row_count(source_table).await?,
            warehouse_count: warehouse.row_count(warehouse_table).await?,
        };
        if !check.passed() {
            tracing::warn!(
                "{} has {} row(s) but {} has {}",
                source_table.name(),
                check.source_count,
                warehouse_table.name(),
                check.warehouse_count
            );
        }
        checks.push(check);
    }
    Ok(checks)
}

pub async fn validate_payment_amounts(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
) -> Result<AmountCheck> {
    let check = AmountCheck {
        source_total: source.payment_total().await?.unwrap_or(0.0),
        warehouse_total: warehouse.payment_total().await?.unwrap_or(0.0),
    };
    if !check.passed() {
        tracing::warn!(
            "Payment totals differ: source {:.2}, warehouse {:.2}",
            check.source_total,
            check.warehouse_total
        );
    }
    Ok(check)
}

pub async fn validate(warehouse: &Warehouse, source: &dyn SourceStore) -> Result<ValidationReport> {
    let tables = validate_counts(warehouse, source).await?;
    let amount = validate_payment_amounts(warehouse, source).await?;
    Ok(ValidationReport { tables, amount })
}
