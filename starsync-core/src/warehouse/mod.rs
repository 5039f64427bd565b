//! The SQLite star schema the engine writes into.

mod rows;
mod watermark;

pub use rows::Upsert;
pub use watermark::{Watermark, WatermarkStore, WATERMARK_FORMAT};

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Rows per destination transaction unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Warehouse tables, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarehouseTable {
    DimFilm,
    DimActor,
    DimCategory,
    DimStore,
    DimCustomer,
    BridgeFilmActor,
    BridgeFilmCategory,
    FactRental,
    FactPayment,
    DimDate,
}

impl WarehouseTable {
    pub const ALL: [WarehouseTable; 10] = [
        WarehouseTable::DimFilm,
        WarehouseTable::DimActor,
        WarehouseTable::DimCategory,
        WarehouseTable::DimStore,
        WarehouseTable::DimCustomer,
        WarehouseTable::BridgeFilmActor,
        WarehouseTable::BridgeFilmCategory,
        WarehouseTable::FactRental,
        WarehouseTable::FactPayment,
        WarehouseTable::DimDate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WarehouseTable::DimFilm => "dim_film",
            WarehouseTable::DimActor => "dim_actor",
            WarehouseTable::DimCategory => "dim_category",
            WarehouseTable::DimStore => "dim_store",
            WarehouseTable::DimCustomer => "dim_customer",
            WarehouseTable::BridgeFilmActor => "bridge_film_actor",
            WarehouseTable::BridgeFilmCategory => "bridge_film_category",
            WarehouseTable::FactRental => "fact_rental",
            WarehouseTable::FactPayment => "fact_payment",
            WarehouseTable::DimDate => "dim_date",
        }
    }
}

/// Fact tables whose surrogate keys are allocated above a running maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactTable {
    Rental,
    Payment,
}

impl FactTable {
    fn table(&self) -> &'static str {
        match self {
            FactTable::Rental => "fact_rental",
            FactTable::Payment => "fact_payment",
        }
    }

    fn key_column(&self) -> &'static str {
        match self {
            FactTable::Rental => "fact_rental_key",
            FactTable::Payment => "fact_payment_key",
        }
    }

    fn natural_id_column(&self) -> &'static str {
        match self {
            FactTable::Rental => "rental_id",
            FactTable::Payment => "payment_id",
        }
    }
}

/// Open the warehouse database, creating the file and schema if needed.
pub async fn init_warehouse(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite:{}?mode=rwc", path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Handle to the destination store. Every syncer receives it by reference.
#[derive(Debug, Clone)]
pub struct Warehouse {
    pool: SqlitePool,
    batch_size: usize,
}

impl Warehouse {
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        let pool = init_warehouse(path).await?;
        tracing::info!("Warehouse ready at {}", path.display());
        Ok(Self::new(pool))
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Rows per commit for batched upserts. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn watermarks(&self) -> WatermarkStore {
        WatermarkStore::new(self.pool.clone())
    }

    /// User tables present in the database, sorted by name.
    pub async fn table_names(&self) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name NOT LIKE '_sqlx_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Upserts `rows`, committing once per batch. Rows in batches committed
    /// before a failure stay written.
    pub async fn upsert_all<T: Upsert>(&self, rows: &[T]) -> Result<usize, sqlx::Error> {
        let mut written = 0;
        for batch in rows.chunks(self.batch_size) {
            let mut tx = self.pool.begin().await?;
            for row in batch {
                row.upsert(&mut *tx).await?;
            }
            tx.commit().await?;
            written += batch.len();
        }
        Ok(written)
    }

    /// Deletes every row of `table` and writes `rows` in a single transaction.
    pub async fn replace_all<T: Upsert>(
        &self,
        table: WarehouseTable,
        rows: &[T],
    ) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DELETE FROM {}", table.name()))
            .execute(&mut *tx)
            .await?;
        for row in rows {
            row.upsert(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(rows.len())
    }

    pub async fn truncate(&self, table: WarehouseTable) -> Result<(), sqlx::Error> {
        sqlx::query(&format!("DELETE FROM {}", table.name()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn row_count(&self, table: WarehouseTable) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table.name()))
            .fetch_one(&self.pool)
            .await
    }

    /// Highest surrogate key in a fact table, `None` when it is empty.
    pub async fn max_fact_key(&self, fact: FactTable) -> Result<Option<i64>, sqlx::Error> {
        let sql = format!("SELECT MAX({}) FROM {}", fact.key_column(), fact.table());
        sqlx::query_scalar(&sql).fetch_one(&self.pool).await
    }

    /// Natural id → surrogate key for every row already in a fact table.
    pub async fn fact_keys(&self, fact: FactTable) -> Result<HashMap<i64, i64>, sqlx::Error> {
        let sql = format!(
            "SELECT {natural}, MIN({key}) FROM {table} GROUP BY {natural}",
            natural = fact.natural_id_column(),
            key = fact.key_column(),
            table = fact.table()
        );
        let rows: Vec<(i64, i64)> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().collect())
    }

    /// Earliest and latest `date_key` in `dim_date`.
    pub async fn date_key_bounds(&self) -> Result<(Option<String>, Option<String>), sqlx::Error> {
        sqlx::query_as("SELECT MIN(date_key), MAX(date_key) FROM dim_date")
            .fetch_one(&self.pool)
            .await
    }

    /// `SUM(fact_payment.amount)`, `None` when there are no payments.
    pub async fn payment_total(&self) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar("SELECT SUM(amount) FROM fact_payment")
            .fetch_one(&self.pool)
            .await
    }
}
