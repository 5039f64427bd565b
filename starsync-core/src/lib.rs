//! starsync-core: incremental sync from the Sakila rental schema into a
//! SQLite star schema.
//!
//! This crate provides:
//! - Warehouse row models and surrogate key derivation
//! - The [`SourceStore`] abstraction and its MySQL implementation
//! - The SQLite [`Warehouse`] with its schema migrations and watermarks
//! - Dimension, bridge, fact and date syncers, and the orchestrator that runs them
//! - Count and amount validation

pub mod error;
pub mod keys;
pub mod models;
pub mod source;
pub mod sync;
pub mod validate;
pub mod warehouse;

#[cfg(test)]
mod testing;

pub use error::{Result, SyncError};
pub use source::{MySqlSource, MySqlSourceOptions, SourceStore, SourceTable, TimestampColumn};
pub use sync::{run_full_load, run_incremental, SyncReport, SyncTable, SyncWindow, TableOutcome};
pub use validate::{validate, AmountCheck, TableCheck, ValidationReport};
pub use warehouse::{init_warehouse, Warehouse, WarehouseTable, Watermark, WatermarkStore};

/// Library version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
