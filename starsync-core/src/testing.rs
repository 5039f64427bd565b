//! Shared fixtures for the engine tests.

use tempfile::TempDir;

use crate::warehouse::Warehouse;

/// A fresh, migrated warehouse in a temp directory. Keep the `TempDir`
/// alive for the duration of the test.
pub async fn setup() -> (Warehouse, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let warehouse = Warehouse::open(&temp_dir.path().join("warehouse.db"))
        .await
        .unwrap();
    (warehouse, temp_dir)
}
