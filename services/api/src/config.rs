//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// Local development database endpoint (the port the local stack exposes Postgres on).
pub const LOCAL_DATABASE_URL: &str = "postgres://postgres@127.0.0.1:54322/postgres";
/// Local development database key.
pub const LOCAL_DATABASE_KEY: &str = "postgres";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which deployment the process runs in, selected by `APP_ENV`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Production,
    Local,
}

/// Connection parameters for the hosted database.
#[derive(Clone, Debug)]
pub struct DataStoreConfig {
    pub url: String,
    /// Applied as the connection password on top of `url`.
    pub key: String,
    pub max_connections: u32,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub data_store: DataStoreConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Local,
        };

        // --- Load Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Database Settings ---
        // Production never falls back to the local endpoint.
        let (url, key) = match environment {
            Environment::Production => (
                lookup("DATABASE_URL")
                    .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?,
                lookup("DATABASE_KEY")
                    .ok_or_else(|| ConfigError::MissingVar("DATABASE_KEY".to_string()))?,
            ),
            Environment::Local => (
                lookup("DATABASE_URL").unwrap_or_else(|| LOCAL_DATABASE_URL.to_string()),
                lookup("DATABASE_KEY").unwrap_or_else(|| LOCAL_DATABASE_KEY.to_string()),
            ),
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "DATABASE_MAX_CONNECTIONS".to_string(),
                    format!("'{}' is not a positive integer", raw),
                )
            })?,
            None => 5,
        };

        Ok(Self {
            environment,
            bind_address,
            log_level,
            data_store: DataStoreConfig {
                url,
                key,
                max_connections,
            },
        })
    }
}
