//! Runs every syncer in load order and maintains watermarks.

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::source::SourceStore;
use crate::sync::{
    rebuild_bridge_film_actor, rebuild_bridge_film_category, sync_dim_date, SyncTable, SyncWindow,
};
use crate::warehouse::{Warehouse, WarehouseTable, WatermarkStore};

/// What one watermark-bearing table did during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOutcome {
    pub table: SyncTable,
    pub rows: usize,
    /// Watermark after the run.
    pub watermark: Option<NaiveDateTime>,
    /// False when the table was already up to date.
    pub advanced: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub tables: Vec<TableOutcome>,
    pub film_actor_pairs: usize,
    pub film_category_pairs: usize,
    pub days_added: usize,
}

impl SyncReport {
    pub fn rows_written(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Brings the warehouse up to date with the source.
///
/// Each table's window ends at the source maximum read *before* its syncer
/// runs, and that same value becomes the new watermark. Rows that arrive
/// while the syncer is running are picked up by the next run, as long as
/// their timestamp is later than the snapshot. A row stamped with exactly
/// the snapshot value but committed after the snapshot query is never
/// loaded incrementally, since later windows start strictly after it; only
/// a full load brings it in. If a syncer fails, tables already processed
/// keep their advanced watermarks and the whole run can simply be repeated.
pub async fn run_incremental(warehouse: &Warehouse, source: &dyn SourceStore) -> Result<SyncReport> {
    tracing::info!("Starting incremental sync");
    let watermarks = warehouse.watermarks();
    let mut report = SyncReport::default();

    for table in SyncTable::ORDERED {
        let outcome = sync_table(warehouse, source, &watermarks, table).await?;
        report.tables.push(outcome);
    }

    report.film_actor_pairs = rebuild_bridge_film_actor(warehouse, source).await?;
    report.film_category_pairs = rebuild_bridge_film_category(warehouse, source).await?;
    report.days_added = sync_dim_date(warehouse, source).await?;

    tracing::info!("Sync finished: {} row(s) written", report.rows_written());
    Ok(report)
}

/// Empties every warehouse table and `sync_state`, then loads everything.
pub async fn run_full_load(warehouse: &Warehouse, source: &dyn SourceStore) -> Result<SyncReport> {
    tracing::info!("Starting full load");

    for table in WarehouseTable::ALL {
        warehouse.truncate(table).await?;
    }
    warehouse.watermarks().clear().await?;
    tracing::debug!("Warehouse tables and sync_state cleared");

    run_incremental(warehouse, source).await
}

async fn sync_table(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
    watermarks: &WatermarkStore,
    table: SyncTable,
) -> Result<TableOutcome> {
    let watermark = watermarks.get(table.name()).await?;
    let unchanged = TableOutcome {
        table,
        rows: 0,
        watermark,
        advanced: false,
    };

    let Some(through) = source.max_timestamp(table.driving_column()).await? else {
        tracing::warn!("{}: source {} has no rows", table, table.driving_column());
        return Ok(unchanged);
    };

    if watermark.is_some_and(|w| through <= w) {
        tracing::debug!("{}: up to date at {}", table, through);
        return Ok(unchanged);
    }

    let window = SyncWindow::since(watermark, through);
    tracing::debug!("{}: syncing ({}, {}]", table, window.after, window.through);

    let rows = table.sync(warehouse, source, &window).await?;
    watermarks.set(table.name(), through).await?;

    Ok(TableOutcome {
        table,
        rows,
        watermark: Some(through),
        advanced: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use crate::models::{ActorRecord, PaymentRecord, RentalRecord};
    use crate::source::memory::{sakila_fixture, ts, MemorySource};
    use crate::source::TimestampColumn;
    use crate::testing::setup;

    fn outcome(report: &SyncReport, table: SyncTable) -> &TableOutcome {
        report.tables.iter().find(|t| t.table == table).unwrap()
    }

    async fn keys(warehouse: &Warehouse, sql: &str) -> Vec<i64> {
        sqlx::query_scalar(sql)
            .fetch_all(warehouse.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_run_loads_everything() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());

        let report = run_incremental(&warehouse, &source).await.unwrap();

        assert_eq!(outcome(&report, SyncTable::DimFilm).rows, 2);
        assert_eq!(outcome(&report, SyncTable::DimActor).rows, 3);
        assert_eq!(outcome(&report, SyncTable::FactRental).rows, 3);
        assert_eq!(outcome(&report, SyncTable::FactPayment).rows, 2);
        assert_eq!(report.film_actor_pairs, 3);
        assert_eq!(report.film_category_pairs, 2);
        assert!(report.days_added > 0);
    }

    #[tokio::test]
    async fn test_watermarks_equal_source_maximum() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());

        run_incremental(&warehouse, &source).await.unwrap();

        let store = warehouse.watermarks();
        for table in SyncTable::ORDERED {
            let expected = source
                .max_timestamp(table.driving_column())
                .await
                .unwrap();
            assert_eq!(store.get(table.name()).await.unwrap(), expected, "{}", table);
        }
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());
        run_incremental(&warehouse, &source).await.unwrap();

        let report = run_incremental(&warehouse, &source).await.unwrap();

        assert_eq!(report.rows_written(), 0);
        assert!(report.tables.iter().all(|t| !t.advanced));
        assert_eq!(report.days_added, 0);
    }

    #[tokio::test]
    async fn test_new_rows_are_picked_up() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());
        run_incremental(&warehouse, &source).await.unwrap();

        source.update(|t| {
            t.rentals.push(RentalRecord {
                rental_id: 4,
                rental_date: ts("2005-05-26 09:00:00"),
                return_date: None,
                customer_id: 2,
                staff_id: 1,
                film_id: Some(1),
                store_id: Some(1),
            });
            t.payments.push(PaymentRecord {
                payment_id: 3,
                payment_date: ts("2005-05-29 12:00:00"),
                customer_id: 2,
                staff_id: 1,
                amount: 4.99,
                store_id: Some(1),
            });
        });
        let report = run_incremental(&warehouse, &source).await.unwrap();

        let rentals = outcome(&report, SyncTable::FactRental);
        assert_eq!(rentals.rows, 1);
        assert_eq!(rentals.watermark, Some(ts("2005-05-26 09:00:00")));
        assert_eq!(outcome(&report, SyncTable::FactPayment).rows, 1);
        assert_eq!(outcome(&report, SyncTable::DimFilm).rows, 0);

        let rental_keys = keys(&warehouse, "SELECT fact_rental_key FROM fact_rental WHERE rental_id = 4").await;
        assert_eq!(rental_keys, vec![50_004]);
    }

    #[tokio::test]
    async fn test_watermarks_never_decrease() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());
        run_incremental(&warehouse, &source).await.unwrap();
        let before = warehouse.watermarks().get("dim_actor").await.unwrap();

        source.update(|t| t.actors.retain(|a| a.actor_id == 1));
        source.update(|t| t.actors[0].last_update = ts("2006-01-01 00:00:00"));
        run_incremental(&warehouse, &source).await.unwrap();

        assert_eq!(warehouse.watermarks().get("dim_actor").await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_late_row_at_watermark_needs_full_load() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());
        run_incremental(&warehouse, &source).await.unwrap();

        source.update(|t| {
            t.payments.push(PaymentRecord {
                payment_id: 3,
                payment_date: ts("2005-05-28 10:35:23"),
                customer_id: 1,
                staff_id: 1,
                amount: 1.99,
                store_id: Some(1),
            })
        });
        run_incremental(&warehouse, &source).await.unwrap();
        assert_eq!(warehouse.row_count(WarehouseTable::FactPayment).await.unwrap(), 2);

        run_full_load(&warehouse, &source).await.unwrap();
        assert_eq!(warehouse.row_count(WarehouseTable::FactPayment).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_source_table_leaves_watermark_absent() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());
        source.update(|t| t.payments.clear());

        let report = run_incremental(&warehouse, &source).await.unwrap();

        let payments = outcome(&report, SyncTable::FactPayment);
        assert!(!payments.advanced);
        assert_eq!(payments.watermark, None);
        assert_eq!(warehouse.watermarks().get("fact_payment").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_watermarks() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());
        source.update(|t| t.customers[1].country = None);

        let result = run_incremental(&warehouse, &source).await;

        assert!(matches!(result, Err(SyncError::MissingLookup { .. })));
        let store = warehouse.watermarks();
        assert!(store.get("dim_store").await.unwrap().is_some());
        assert_eq!(store.get("dim_customer").await.unwrap(), None);
        assert_eq!(store.get("fact_rental").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_full_load_referential_integrity() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());

        run_full_load(&warehouse, &source).await.unwrap();

        let orphans = [
            "SELECT film_key FROM bridge_film_actor WHERE film_key NOT IN (SELECT film_key FROM dim_film)",
            "SELECT actor_key FROM bridge_film_actor WHERE actor_key NOT IN (SELECT actor_key FROM dim_actor)",
            "SELECT film_key FROM bridge_film_category WHERE film_key NOT IN (SELECT film_key FROM dim_film)",
            "SELECT category_key FROM bridge_film_category WHERE category_key NOT IN (SELECT category_key FROM dim_category)",
            "SELECT film_key FROM fact_rental WHERE film_key NOT IN (SELECT film_key FROM dim_film)",
            "SELECT store_key FROM fact_rental WHERE store_key NOT IN (SELECT store_key FROM dim_store)",
            "SELECT customer_key FROM fact_rental WHERE customer_key NOT IN (SELECT customer_key FROM dim_customer)",
            "SELECT customer_key FROM fact_payment WHERE customer_key NOT IN (SELECT customer_key FROM dim_customer)",
            "SELECT store_key FROM fact_payment WHERE store_key NOT IN (SELECT store_key FROM dim_store)",
            "SELECT 1 FROM fact_rental WHERE date_key_rented NOT IN (SELECT date_key FROM dim_date)",
            "SELECT 1 FROM fact_rental WHERE date_key_returned IS NOT NULL AND date_key_returned NOT IN (SELECT date_key FROM dim_date)",
            "SELECT 1 FROM fact_payment WHERE date_key_paid NOT IN (SELECT date_key FROM dim_date)",
        ];
        for sql in orphans {
            assert!(keys(&warehouse, sql).await.is_empty(), "{}", sql);
        }
    }

    #[tokio::test]
    async fn test_full_load_resets_keys_and_removes_deleted_rows() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());
        run_incremental(&warehouse, &source).await.unwrap();

        source.update(|t| {
            t.actors.push(ActorRecord {
                actor_id: 4,
                first_name: "JENNIFER".to_string(),
                last_name: "DAVIS".to_string(),
                last_update: ts("2006-02-15 04:34:33"),
            });
            t.rentals.remove(0);
        });
        run_full_load(&warehouse, &source).await.unwrap();

        assert_eq!(warehouse.row_count(WarehouseTable::DimActor).await.unwrap(), 4);
        let rental_keys = keys(&warehouse, "SELECT fact_rental_key FROM fact_rental ORDER BY fact_rental_key").await;
        assert_eq!(rental_keys, vec![50_001, 50_002]);
        assert_eq!(
            warehouse.watermarks().get("fact_rental").await.unwrap(),
            source.max_timestamp(TimestampColumn::RentalDate).await.unwrap()
        );
    }
}
