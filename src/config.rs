use serde::Deserialize;
use std::path::{Path, PathBuf};

use starsync_core::warehouse::DEFAULT_BATCH_SIZE;
use starsync_core::MySqlSourceOptions;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Connection settings for the source database
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            database: "sakila".to_string(),
            username: None,
            password: None,
        }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite warehouse
    pub warehouse_path: ConfigValue<PathBuf>,
    /// Rows per warehouse transaction
    pub batch_size: ConfigValue<usize>,
    /// Config file path used (if any)
    pub config_file: Option<PathBuf>,
    pub source: SourceConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    warehouse_path: Option<PathBuf>,
    batch_size: Option<usize>,
    source: Option<SourceConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut warehouse_path = ConfigValue::new(
            Self::default_data_dir().join("warehouse.db"),
            ConfigSource::Default,
        );
        let mut batch_size = ConfigValue::new(DEFAULT_BATCH_SIZE, ConfigSource::Default);
        let mut config_file = None;
        let mut source = SourceConfig::default();

        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(db_path) = file_config.warehouse_path {
                warehouse_path = ConfigValue::new(resolve_relative(&path, db_path), ConfigSource::File);
            }
            if let Some(size) = file_config.batch_size {
                batch_size = ConfigValue::new(size, ConfigSource::File);
            }
            if let Some(source_config) = file_config.source {
                source = source_config;
            }
        }

        if let Ok(db_path) = std::env::var("STARSYNC_WAREHOUSE_PATH") {
            warehouse_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(size) = std::env::var("STARSYNC_BATCH_SIZE") {
            let size = parse_env("STARSYNC_BATCH_SIZE", &size)?;
            batch_size = ConfigValue::new(size, ConfigSource::Environment);
        }
        if let Ok(host) = std::env::var("STARSYNC_SOURCE_HOST") {
            source.host = host;
        }
        if let Ok(port) = std::env::var("STARSYNC_SOURCE_PORT") {
            source.port = parse_env("STARSYNC_SOURCE_PORT", &port)?;
        }
        if let Ok(database) = std::env::var("STARSYNC_SOURCE_DATABASE") {
            source.database = database;
        }
        if let Ok(username) = std::env::var("STARSYNC_SOURCE_USERNAME") {
            source.username = Some(username);
        }
        if let Ok(password) = std::env::var("STARSYNC_SOURCE_PASSWORD") {
            source.password = Some(password);
        }

        Ok(Self {
            warehouse_path,
            batch_size,
            config_file,
            source,
        })
    }

    /// Connection options for the source, which needs both credentials.
    pub fn source_options(&self) -> Result<MySqlSourceOptions, ConfigError> {
        match (&self.source.username, &self.source.password) {
            (Some(username), Some(password)) => Ok(MySqlSourceOptions {
                host: self.source.host.clone(),
                port: self.source.port,
                database: self.source.database.clone(),
                username: username.clone(),
                password: password.clone(),
            }),
            _ => Err(ConfigError::MissingCredentials),
        }
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/starsync/
    /// - macOS: ~/Library/Application Support/starsync/
    /// - Windows: %APPDATA%/starsync/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("starsync")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/starsync/
    /// - macOS: ~/Library/Application Support/starsync/
    /// - Windows: %APPDATA%/starsync/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("starsync")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

// Relative paths in the file are relative to the file's directory
fn resolve_relative(config_path: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        config_path.parent().map(|p| p.join(&path)).unwrap_or(path)
    } else {
        path
    }
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnv(name, value.to_string()))
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidEnv(&'static str, String),
    MissingCredentials,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidEnv(name, value) => {
                write!(f, "Invalid value for {}: '{}'", name, value)
            }
            ConfigError::MissingCredentials => write!(
                f,
                "Source credentials not configured. Set source.username and source.password \
                 in the config file, or STARSYNC_SOURCE_USERNAME and STARSYNC_SOURCE_PASSWORD"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
