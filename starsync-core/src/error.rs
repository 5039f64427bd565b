//! Sync error types.

use thiserror::Error;

/// Errors that abort a syncer, a full load or a validation run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Query against the source store failed (including connection failures)
    #[error("Source error: {0}")]
    Source(#[source] sqlx::Error),

    /// Query or write against the warehouse failed
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] sqlx::Error),

    /// A source row references a lookup row that does not exist
    #[error("{table} {id}: no matching {lookup} row")]
    MissingLookup {
        table: &'static str,
        id: i64,
        lookup: &'static str,
    },

    /// No timestamps anywhere in the source, so there is no date range to build
    #[error("No source timestamps found; cannot build an empty date range")]
    EmptyDateRange,

    /// A stored watermark could not be parsed
    #[error("Invalid watermark for {table}: '{value}'")]
    InvalidWatermark { table: String, value: String },

    /// A stored date key could not be parsed
    #[error("Invalid date key: '{0}'")]
    InvalidDateKey(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
