//! Per-table resume points for incremental runs, stored in `sync_state`.

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::error::SyncError;

/// Layout of `sync_state.last_update`.
pub const WATERMARK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watermark {
    pub table_name: String,
    pub last_update: NaiveDateTime,
}

#[derive(sqlx::FromRow)]
struct SyncStateRow {
    table_name: String,
    last_update: String,
}

impl SyncStateRow {
    fn parse(self) -> Result<Watermark, SyncError> {
        let last_update = NaiveDateTime::parse_from_str(&self.last_update, WATERMARK_FORMAT)
            .map_err(|_| SyncError::InvalidWatermark {
                table: self.table_name.clone(),
                value: self.last_update.clone(),
            })?;
        Ok(Watermark {
            table_name: self.table_name,
            last_update,
        })
    }
}

/// Reads and writes `sync_state`.
///
/// A watermark is the largest source timestamp already loaded for a table.
/// It is written in its own commit after the table's data, so a crash in
/// between only causes those rows to be synced again.
pub struct WatermarkStore {
    pool: SqlitePool,
}

impl WatermarkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// `None` means the table has never been synced.
    pub async fn get(&self, table_name: &str) -> Result<Option<NaiveDateTime>, SyncError> {
        let row: Option<SyncStateRow> =
            sqlx::query_as("SELECT table_name, last_update FROM sync_state WHERE table_name = ?")
                .bind(table_name)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|r| r.parse().map(|w| w.last_update)).transpose()
    }

    pub async fn set(&self, table_name: &str, last_update: NaiveDateTime) -> Result<(), SyncError> {
        let formatted = last_update.format(WATERMARK_FORMAT).to_string();

        sqlx::query(
            r#"
            INSERT INTO sync_state (table_name, last_update) VALUES (?, ?)
            ON CONFLICT(table_name) DO UPDATE SET last_update = excluded.last_update
            "#,
        )
        .bind(table_name)
        .bind(&formatted)
        .execute(&self.pool)
        .await?;

        tracing::debug!("sync_state updated: {} -> {}", table_name, formatted);
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Watermark>, SyncError> {
        let rows: Vec<SyncStateRow> =
            sqlx::query_as("SELECT table_name, last_update FROM sync_state ORDER BY table_name")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(SyncStateRow::parse).collect()
    }

    pub async fn clear(&self) -> Result<(), SyncError> {
        sqlx::query("DELETE FROM sync_state")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
