//! Film/actor and film/category bridges.
//!
//! The source join tables carry no usable change marker, so each run
//! replaces the bridge wholesale. The delete and the reload share one
//! transaction; readers never see a half-empty bridge.

use crate::error::Result;
use crate::models::{BridgeFilmActor, BridgeFilmCategory};
use crate::source::SourceStore;
use crate::warehouse::{Warehouse, WarehouseTable};

pub async fn rebuild_bridge_film_actor(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
) -> Result<usize> {
    let pairs: Vec<BridgeFilmActor> = source
        .film_actors()
        .await?
        .into_iter()
        .map(BridgeFilmActor::from)
        .collect();

    let written = warehouse
        .replace_all(WarehouseTable::BridgeFilmActor, &pairs)
        .await?;
    tracing::info!("bridge_film_actor: rebuilt with {} pair(s)", written);
    Ok(written)
}

pub async fn rebuild_bridge_film_category(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
) -> Result<usize> {
    let pairs: Vec<BridgeFilmCategory> = source
        .film_categories()
        .await?
        .into_iter()
        .map(BridgeFilmCategory::from)
        .collect();

    let written = warehouse
        .replace_all(WarehouseTable::BridgeFilmCategory, &pairs)
        .await?;
    tracing::info!("bridge_film_category: rebuilt with {} pair(s)", written);
    Ok(written)
}
