use std::path::Path;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "fintrack", about = "fintrack - salary and expense records")]
pub struct CliArgs {
    /// Path to config file
    #[arg(short, long, default_value = "fintrack.toml")]
    pub config: String,

    /// Storage backend (overrides config file)
    #[arg(short, long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Memory,
    Sqlite,
    Postgres,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: BackendKind,

    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,

    /// libpq-style connection string, e.g. `host=localhost user=postgres dbname=fintrack`.
    #[serde(default)]
    pub postgres_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

fn default_backend() -> BackendKind {
    BackendKind::Sqlite
}

fn default_sqlite_path() -> String {
    "fintrack.db".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            backend: default_backend(),
            sqlite_path: default_sqlite_path(),
            postgres_url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Reads the config file named on the command line, falling back to
    /// defaults when it does not exist, then applies CLI overrides.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = if Path::new(&cli.config).exists() {
            let contents = std::fs::read_to_string(&cli.config).map_err(|source| ConfigError::Read {
                path: cli.config.clone(),
                source,
            })?;
            Self::from_toml(&contents)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(backend) = cli.backend {
            config.storage.backend = backend;
        }
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}
