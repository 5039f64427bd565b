//! `--mode Init`: create the warehouse schema.

use crate::config::Config;

use super::{open_warehouse, CommandError};

pub async fn run_init(config: &Config) -> Result<(), CommandError> {
    let warehouse = open_warehouse(config).await?;
    let tables = warehouse.table_names().await?;

    println!(
        "Warehouse initialized at {}",
        config.warehouse_path.value.display()
    );
    println!();
    println!("Tables:");
    for table in tables {
        println!("  {}", table);
    }

    Ok(())
}
