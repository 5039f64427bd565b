use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "starsync")]
#[command(version)]
#[command(about = "Incremental sync from Sakila into a SQLite star schema", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// What to run
    #[arg(long, short, value_enum, ignore_case = true)]
    mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Create the warehouse schema
    #[value(name = "Init")]
    Init,

    /// Rebuild every warehouse table from the source
    #[value(name = "Full-load")]
    FullLoad,

    /// Sync rows changed since the last run
    #[value(name = "Incremental")]
    Incremental,

    /// Compare source and warehouse counts and payment totals
    #[value(name = "Validate")]
    Validate,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "starsync=info,starsync_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;
    if let Some(path) = &config.config_file {
        tracing::debug!("Loaded config from {}", path.display());
    }
    tracing::debug!(
        "Warehouse path {} ({}), batch size {} ({})",
        config.warehouse_path.value.display(),
        config.warehouse_path.source,
        config.batch_size.value,
        config.batch_size.source
    );

    match cli.mode {
        Mode::Init => commands::run_init(&config).await?,
        Mode::FullLoad => commands::run_full_load(&config).await?,
        Mode::Incremental => commands::run_incremental(&config).await?,
        Mode::Validate => commands::run_validate(&config).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names() {
        let cli = Cli::try_parse_from(["starsync", "--mode", "Full-load"]).unwrap();
        assert_eq!(cli.mode, Mode::FullLoad);

        let cli = Cli::try_parse_from(["starsync", "--mode", "incremental"]).unwrap();
        assert_eq!(cli.mode, Mode::Incremental);
    }

    #[test]
    fn test_invalid_mode_rejected() {
        assert!(Cli::try_parse_from(["starsync", "--mode", "Backfill"]).is_err());
    }

    #[test]
    fn test_mode_required() {
        assert!(Cli::try_parse_from(["starsync"]).is_err());
    }
}
