mod full_load;
mod incremental;
mod init;
mod validate;

pub use full_load::run_full_load;
pub use incremental::run_incremental;
pub use init::run_init;
pub use validate::run_validate;

use starsync_core::{MySqlSource, SyncError, SyncReport, Warehouse};

use crate::config::{Config, ConfigError};

/// Opens (and migrates) the configured warehouse.
async fn open_warehouse(config: &Config) -> Result<Warehouse, CommandError> {
    let warehouse = Warehouse::open(&config.warehouse_path.value).await?;
    Ok(warehouse.with_batch_size(config.batch_size.value))
}

async fn connect_source(config: &Config) -> Result<MySqlSource, CommandError> {
    let options = config.source_options()?;
    Ok(MySqlSource::connect(&options).await?)
}

fn print_report(report: &SyncReport) {
    for outcome in &report.tables {
        if outcome.advanced {
            println!(
                "  ✓ {:<14} {} row{}",
                outcome.table.name(),
                outcome.rows,
                if outcome.rows == 1 { "" } else { "s" }
            );
        } else {
            println!("  ✓ {:<14} up to date", outcome.table.name());
        }
    }
    println!("  ✓ {:<14} {} pairs", "film_actor", report.film_actor_pairs);
    println!("  ✓ {:<14} {} pairs", "film_category", report.film_category_pairs);
    println!("  ✓ {:<14} {} new days", "dim_date", report.days_added);
}

async fn print_watermarks(warehouse: &Warehouse) -> Result<(), CommandError> {
    let watermarks = warehouse.watermarks().list().await?;

    println!();
    println!("Watermarks:");
    if watermarks.is_empty() {
        println!("  (none)");
    }
    for watermark in watermarks {
        println!("  {:<14} {}", watermark.table_name, watermark.last_update);
    }
    Ok(())
}

/// Errors from CLI modes
#[derive(Debug)]
pub enum CommandError {
    Config(ConfigError),
    Sync(SyncError),
    Warehouse(sqlx::Error),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Config(e) => write!(f, "{}", e),
            CommandError::Sync(e) => write!(f, "{}", e),
            CommandError::Warehouse(e) => write!(f, "Failed to open warehouse: {}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Config(e) => Some(e),
            CommandError::Sync(e) => Some(e),
            CommandError::Warehouse(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(e: ConfigError) -> Self {
        CommandError::Config(e)
    }
}

impl From<SyncError> for CommandError {
    fn from(e: SyncError) -> Self {
        CommandError::Sync(e)
    }
}

impl From<sqlx::Error> for CommandError {
    fn from(e: sqlx::Error) -> Self {
        CommandError::Warehouse(e)
    }
}
