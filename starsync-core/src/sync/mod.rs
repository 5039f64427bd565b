//! Incremental synchronization from the source schema into the warehouse.
//!
//! # Load order
//!
//! Dimensions are written before anything that references them:
//!
//! 1. `dim_film`, `dim_actor`, `dim_category`, `dim_store`, `dim_customer`
//! 2. `fact_rental`, `fact_payment`
//! 3. `bridge_film_actor`, `bridge_film_category` (rebuilt in full)
//! 4. `dim_date` (extended to cover every source timestamp)
//!
//! The warehouse does not enforce foreign keys, so this order is what keeps
//! bridge and fact keys pointing at existing dimension rows.
//!
//! # Single writer
//!
//! Runs must not overlap. Two concurrent runs against the same warehouse
//! race on the watermark read-then-write, on fact key allocation (max, then
//! insert) and on the bridge delete-then-reload. Nothing here locks.

pub mod bridge;
pub mod calendar;
pub mod dimension;
pub mod fact;
pub mod orchestrator;

pub use bridge::{rebuild_bridge_film_actor, rebuild_bridge_film_category};
pub use calendar::{source_date_range, sync_dim_date};
pub use dimension::{
    sync_dim_actor, sync_dim_category, sync_dim_customer, sync_dim_film, sync_dim_store,
};
pub use fact::{sync_fact_payment, sync_fact_rental};
pub use orchestrator::{run_full_load, run_incremental, SyncReport, TableOutcome};

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::source::{SourceStore, TimestampColumn};
use crate::warehouse::Warehouse;

/// Watermark used for tables that have never been synced.
pub fn beginning_of_time() -> NaiveDateTime {
    // 1970-01-01 00:00:00
    NaiveDateTime::default()
}

/// The half-open timestamp range `(after, through]` a syncer loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    pub after: NaiveDateTime,
    pub through: NaiveDateTime,
}

impl SyncWindow {
    pub fn new(after: NaiveDateTime, through: NaiveDateTime) -> Self {
        Self { after, through }
    }

    /// Window starting at a stored watermark, or at the beginning of time.
    pub fn since(watermark: Option<NaiveDateTime>, through: NaiveDateTime) -> Self {
        Self::new(watermark.unwrap_or_else(beginning_of_time), through)
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp > self.after && timestamp <= self.through
    }
}

/// A watermark-bearing table and the syncer that loads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncTable {
    DimFilm,
    DimActor,
    DimCategory,
    DimStore,
    DimCustomer,
    FactRental,
    FactPayment,
}

impl SyncTable {
    /// Dimensions first, then facts.
    pub const ORDERED: [SyncTable; 7] = [
        SyncTable::DimFilm,
        SyncTable::DimActor,
        SyncTable::DimCategory,
        SyncTable::DimStore,
        SyncTable::DimCustomer,
        SyncTable::FactRental,
        SyncTable::FactPayment,
    ];

    /// Key in `sync_state`.
    pub fn name(&self) -> &'static str {
        match self {
            SyncTable::DimFilm => "dim_film",
            SyncTable::DimActor => "dim_actor",
            SyncTable::DimCategory => "dim_category",
            SyncTable::DimStore => "dim_store",
            SyncTable::DimCustomer => "dim_customer",
            SyncTable::FactRental => "fact_rental",
            SyncTable::FactPayment => "fact_payment",
        }
    }

    /// Source column the window and the watermark are measured on.
    pub fn driving_column(&self) -> TimestampColumn {
        match self {
            SyncTable::DimFilm => TimestampColumn::FilmLastUpdate,
            SyncTable::DimActor => TimestampColumn::ActorLastUpdate,
            SyncTable::DimCategory => TimestampColumn::CategoryLastUpdate,
            SyncTable::DimStore => TimestampColumn::StoreLastUpdate,
            SyncTable::DimCustomer => TimestampColumn::CustomerLastUpdate,
            SyncTable::FactRental => TimestampColumn::RentalDate,
            SyncTable::FactPayment => TimestampColumn::PaymentDate,
        }
    }

    /// Runs this table's syncer over `window`, returning rows written.
    pub async fn sync(
        &self,
        warehouse: &Warehouse,
        source: &dyn SourceStore,
        window: &SyncWindow,
    ) -> Result<usize> {
        match self {
            SyncTable::DimFilm => sync_dim_film(warehouse, source, window).await,
            SyncTable::DimActor => sync_dim_actor(warehouse, source, window).await,
            SyncTable::DimCategory => sync_dim_category(warehouse, source, window).await,
            SyncTable::DimStore => sync_dim_store(warehouse, source, window).await,
            SyncTable::DimCustomer => sync_dim_customer(warehouse, source, window).await,
            SyncTable::FactRental => sync_fact_rental(warehouse, source, window).await,
            SyncTable::FactPayment => sync_fact_payment(warehouse, source, window).await,
        }
    }
}

impl std::fmt::Display for SyncTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::ts;

    #[test]
    fn test_window_excludes_lower_bound() {
        let window = SyncWindow::new(ts("2006-02-15 05:03:42"), ts("2006-02-16 00:00:00"));

        assert!(!window.contains(ts("2006-02-15 05:03:42")));
        assert!(window.contains(ts("2006-02-15 05:03:43")));
        assert!(window.contains(ts("2006-02-16 00:00:00")));
        assert!(!window.contains(ts("2006-02-16 00:00:01")));
    }

    #[test]
    fn test_window_without_watermark_starts_at_epoch() {
        let window = SyncWindow::since(None, ts("2006-02-15 05:03:42"));
        assert_eq!(window.after, ts("1970-01-01 00:00:00"));
    }

    #[test]
    fn test_dimensions_ordered_before_facts() {
        let names: Vec<&str> = SyncTable::ORDERED.iter().map(|t| t.name()).collect();
        let first_fact = names.iter().position(|n| n.starts_with("fact_")).unwrap();
        assert!(names[..first_fact].iter().all(|n| n.starts_with("dim_")));
        assert!(names[first_fact..].iter().all(|n| n.starts_with("fact_")));
    }
}
