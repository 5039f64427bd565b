//! Date dimension maintenance.
//!
//! `dim_date` must hold one row for every calendar day between the earliest
//! and latest timestamp found anywhere in the source. Existing rows are
//! never rewritten; only days outside the stored range are added.

use chrono::NaiveDate;

use crate::error::{Result, SyncError};
use crate::models::{parse_date_key, DimDate};
use crate::source::{SourceStore, TimestampColumn};
use crate::warehouse::Warehouse;

/// Earliest and latest calendar day across every source timestamp column.
pub async fn source_date_range(source: &dyn SourceStore) -> Result<(NaiveDate, NaiveDate)> {
    let mut first: Option<NaiveDate> = None;
    let mut last: Option<NaiveDate> = None;

    for column in TimestampColumn::ALL {
        if let Some(min) = source.min_timestamp(column).await? {
            let day = min.date();
            first = Some(first.map_or(day, |d| d.min(day)));
        }
        if let Some(max) = source.max_timestamp(column).await? {
            let day = max.date();
            last = Some(last.map_or(day, |d| d.max(day)));
        }
    }

    match (first, last) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(SyncError::EmptyDateRange),
    }
}

/// Adds the days of the source range that `dim_date` does not cover yet.
/// Returns the number of rows added.
pub async fn sync_dim_date(warehouse: &Warehouse, source: &dyn SourceStore) -> Result<usize> {
    let (first, last) = source_date_range(source).await?;
    let stored = stored_range(warehouse).await?;

    let rows: Vec<DimDate> = missing_days(first, last, stored)
        .into_iter()
        .map(DimDate::from_date)
        .collect();

    if rows.is_empty() {
        tracing::info!("dim_date: already covers {} to {}", first, last);
        return Ok(0);
    }

    let written = warehouse.upsert_all(&rows).await?;
    tracing::info!(
        "dim_date: added {} day(s), range now covers {} to {}",
        written,
        first,
        last
    );
    Ok(written)
}

async fn stored_range(warehouse: &Warehouse) -> Result<Option<(NaiveDate, NaiveDate)>> {
    let parse = |key: String| parse_date_key(&key).ok_or(SyncError::InvalidDateKey(key));

    match warehouse.date_key_bounds().await? {
        (Some(min), Some(max)) => Ok(Some((parse(min)?, parse(max)?))),
        _ => Ok(None),
    }
}

/// Days needed so that the stored range covers `[first, last]`. New days
/// always touch the stored range, which therefore stays contiguous.
fn missing_days(
    first: NaiveDate,
    last: NaiveDate,
    stored: Option<(NaiveDate, NaiveDate)>,
) -> Vec<NaiveDate> {
    let Some((stored_first, stored_last)) = stored else {
        return days_between(first, last);
    };

    let mut days = Vec::new();
    if first < stored_first {
        if let Some(before) = stored_first.pred_opt() {
            days.extend(days_between(first, before));
        }
    }
    if last > stored_last {
        if let Some(after) = stored_last.succ_opt() {
            days.extend(days_between(after, last));
        }
    }
    days
}

/// Inclusive on both ends.
fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::{sakila_fixture, ts, MemorySource, MemoryTables};
    use crate::testing::setup;
    use crate::warehouse::WarehouseTable;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn stored_keys(warehouse: &Warehouse) -> (String, String) {
        let (min, max) = warehouse.date_key_bounds().await.unwrap();
        (min.unwrap(), max.unwrap())
    }

    #[tokio::test]
    async fn test_range_spans_every_timestamp_column() {
        let source = MemorySource::new(sakila_fixture());

        let (first, last) = source_date_range(&source).await.unwrap();

        assert_eq!(first, day(2005, 5, 24));
        assert_eq!(last, day(2006, 2, 15));
    }

    #[tokio::test]
    async fn test_return_dates_extend_range() {
        let source = MemorySource::new(sakila_fixture());
        source.update(|t| t.rentals[0].return_date = Some(ts("2006-03-02 08:00:00")));

        let (_, last) = source_date_range(&source).await.unwrap();

        assert_eq!(last, day(2006, 3, 2));
    }

    #[tokio::test]
    async fn test_empty_source_is_an_error() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(MemoryTables::default());

        let result = sync_dim_date(&warehouse, &source).await;

        assert!(matches!(result, Err(SyncError::EmptyDateRange)));
    }

    #[tokio::test]
    async fn test_initial_build_has_one_row_per_day() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());

        let added = sync_dim_date(&warehouse, &source).await.unwrap();

        let expected = (day(2006, 2, 15) - day(2005, 5, 24)).num_days() as usize + 1;
        assert_eq!(added, expected);
        assert_eq!(
            warehouse.row_count(WarehouseTable::DimDate).await.unwrap(),
            expected as i64
        );
        assert_eq!(
            stored_keys(&warehouse).await,
            ("20050524".to_string(), "20060215".to_string())
        );
    }

    #[tokio::test]
    async fn test_rerun_adds_nothing() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());
        sync_dim_date(&warehouse, &source).await.unwrap();

        let added = sync_dim_date(&warehouse, &source).await.unwrap();

        assert_eq!(added, 0);
    }

    #[tokio::test]
    async fn test_extends_forward() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());
        sync_dim_date(&warehouse, &source).await.unwrap();

        source.update(|t| t.payments[1].payment_date = ts("2006-02-20 09:15:00"));
        let added = sync_dim_date(&warehouse, &source).await.unwrap();

        assert_eq!(added, 5);
        assert_eq!(stored_keys(&warehouse).await.1, "20060220");
    }

    #[tokio::test]
    async fn test_backfills_earlier_days() {
        let (warehouse, _dir) = setup().await;
        let source = MemorySource::new(sakila_fixture());
        sync_dim_date(&warehouse, &source).await.unwrap();

        source.update(|t| t.rentals[0].rental_date = ts("2005-05-20 08:00:00"));
        let added = sync_dim_date(&warehouse, &source).await.unwrap();

        assert_eq!(added, 4);
        assert_eq!(stored_keys(&warehouse).await.0, "20050520");
    }

    #[test]
    fn test_missing_days_both_sides() {
        let days = missing_days(
            day(2005, 5, 1),
            day(2005, 5, 10),
            Some((day(2005, 5, 3), day(2005, 5, 8))),
        );

        assert_eq!(
            days,
            vec![
                day(2005, 5, 1),
                day(2005, 5, 2),
                day(2005, 5, 9),
                day(2005, 5, 10)
            ]
        );
    }

    #[test]
    fn test_missing_days_fill_gap_to_stored_range() {
        let days = missing_days(
            day(2005, 5, 20),
            day(2005, 5, 22),
            Some((day(2005, 5, 1), day(2005, 5, 10))),
        );

        assert_eq!(days.first(), Some(&day(2005, 5, 11)));
        assert_eq!(days.len(), 12);
    }

    #[test]
    fn test_missing_days_inside_stored_range() {
        let days = missing_days(
            day(2005, 5, 4),
            day(2005, 5, 6),
            Some((day(2005, 5, 1), day(2005, 5, 10))),
        );

        assert!(days.is_empty());
    }
}
