//! Fact syncers.
//!
//! A fact row keeps its surrogate key for life: a rental or payment that is
//! already in the warehouse is rewritten under its existing key, and only
//! unseen natural ids get fresh keys above the table's current maximum.

use std::collections::HashMap;

use crate::error::Result;
use crate::keys::{KeyAllocator, PAYMENT_KEY_BASELINE, RENTAL_KEY_BASELINE};
use crate::models::{FactPayment, FactRental};
use crate::source::SourceStore;
use crate::sync::SyncWindow;
use crate::warehouse::{FactTable, Warehouse};

/// Resolves the surrogate key for each natural id of a fact table.
struct FactKeys {
    existing: HashMap<i64, i64>,
    allocator: KeyAllocator,
}

impl FactKeys {
    async fn load(warehouse: &Warehouse, fact: FactTable, baseline: i64) -> Result<Self> {
        let existing = warehouse.fact_keys(fact).await?;
        let max = warehouse.max_fact_key(fact).await?;
        Ok(Self {
            existing,
            allocator: KeyAllocator::new(max, baseline),
        })
    }

    fn key_for(&mut self, natural_id: i64) -> i64 {
        if let Some(key) = self.existing.get(&natural_id) {
            return *key;
        }
        let key = self.allocator.next_key();
        self.existing.insert(natural_id, key);
        key
    }
}

/// Rentals whose `rental_date` falls in `window`.
///
/// A rental returned after it was first synced keeps its old rental date,
/// so it is not picked up again here. Its return columns are filled by a
/// full load.
pub async fn sync_fact_rental(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
    window: &SyncWindow,
) -> Result<usize> {
    let records = source.rentals_changed(window).await?;
    let mut keys = FactKeys::load(warehouse, FactTable::Rental, RENTAL_KEY_BASELINE).await?;

    let rows = records
        .into_iter()
        .map(|record| {
            let key = keys.key_for(record.rental_id);
            FactRental::from_record(record, key)
        })
        .collect::<Result<Vec<_>>>()?;

    let written = warehouse.upsert_all(&rows).await?;
    tracing::info!("fact_rental: wrote {} row(s)", written);
    Ok(written)
}

pub async fn sync_fact_payment(
    warehouse: &Warehouse,
    source: &dyn SourceStore,
    window: &SyncWindow,
) -> Result<usize> {
    let records = source.payments_changed(window).await?;
    let mut keys = FactKeys::load(warehouse, FactTable::Payment, PAYMENT_KEY_BASELINE).await?;

    let rows = records
        .into_iter()
        .map(|record| {
            let key = keys.key_for(record.payment_id);
            FactPayment::from_record(record, key)
        })
        .collect::<Result<Vec<_>>>()?;

    let written = warehouse.upsert_all(&rows).await?;
    tracing::info!("fact_payment: wrote {} row(s)", written);
    Ok(written)
}
