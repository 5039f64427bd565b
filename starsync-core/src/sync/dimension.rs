//! Dimension syncers: read changed source rows, shape them, upsert by key.

use crate::error::Result;
use crate::models::{DimActor, DimCategory, DimCustomer, DimFilm, DimStore};
use crate::source::SourceStore;
use crate::sync::SyncWindow;
use crate::warehouse::{Upsert, Warehouse};

async fn write_rows<T: Upsert>(warehouse: &Warehouse, table: &str, rows: Vec<T>) -> Result<usize> {
    let written = warehouse.upsert_all(&rows).await?;
    tracing::info!("{}: upserted {} row(s)", table, written);
    Ok(written)
}

/// Films changed in `window`. Aborts before writing if any film has no
/// language row.
pub async fn sync_dim_film(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
    window: &SyncWindow,
) -> Result<usize> {
    let rows = source
        .films_changed(window)
        .await?
        .into_iter()
        .map(DimFilm::from_record)
        .collect::<Result<Vec<_>>>()?;

    write_rows(warehouse, "dim_film", rows).await
}

pub async fn sync_dim_actor(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
    window: &SyncWindow,
) -> Result<usize> {
    let rows: Vec<DimActor> = source
        .actors_changed(window)
        .await?
        .into_iter()
        .map(DimActor::from)
        .collect();

    write_rows(warehouse, "dim_actor", rows).await
}

pub async fn sync_dim_category(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
    window: &SyncWindow,
) -> Result<usize> {
    let rows: Vec<DimCategory> = source
        .categories_changed(window)
        .await?
        .into_iter()
        .map(DimCategory::from)
        .collect();

    write_rows(warehouse, "dim_category", rows).await
}

/// Stores changed in `window`, with city and country resolved through the
/// store's address.
pub async fn sync_dim_store(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
    window: &SyncWindow,
) -> Result<usize> {
    let rows = source
        .stores_changed(window)
        .await?
        .into_iter()
        .map(DimStore::from_record)
        .collect::<Result<Vec<_>>>()?;

    write_rows(warehouse, "dim_store", rows).await
}

pub async fn sync_dim_customer(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
    window: &SyncWindow,
) -> Result<usize> {
    let rows = source
        .customers_changed(window)
        .await?
        .into_iter()
        .map(DimCustomer::from_record)
        .collect::<Result<Vec<_>>>()?;

    write_rows(warehouse, "dim_customer", rows).await
}
