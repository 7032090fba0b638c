//! Configuration loading for the employees table initializer.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `EMPLOYEES_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::db::DbSettings;
use crate::initializer::InitializerConfig;

const ENV_PREFIX: &str = "EMPLOYEES_";

/// Application configuration derived from `EMPLOYEES_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Master ("default") connection string. Required.
    #[serde(default)]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    #[serde(default = "default_db_connect_retries")]
    pub db_connect_retries: u32,
    #[serde(default)]
    pub initializer: InitializerSettings,
    #[serde(default)]
    pub registry: RegistrySettings,
}

/// Settings of the employees table initializer section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct InitializerSettings {
    /// Reconcile only the master database instead of every tenant.
    ///
    /// Environment variable: `EMPLOYEES_INITIALIZER_FOR_MASTER`
    #[serde(default)]
    pub for_master: bool,

    /// Insert the baseline rows into empty tables.
    ///
    /// Environment variable: `EMPLOYEES_INITIALIZER_ENABLE_SEEDING`
    #[serde(default)]
    pub enable_seeding: bool,
}

/// Location of the tenant registry inside the master database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RegistrySettings {
    /// Environment variable: `EMPLOYEES_REGISTRY_TABLE`
    #[serde(default = "default_registry_table")]
    pub table: String,

    /// Environment variable: `EMPLOYEES_REGISTRY_COLUMN`
    #[serde(default = "default_registry_column")]
    pub column: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            table: default_registry_table(),
            column: default_registry_column(),
        }
    }
}

impl RegistrySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table.trim().is_empty() {
            return Err(ConfigError::EmptyRegistryIdentifier { field: "table" });
        }
        if self.column.trim().is_empty() {
            return Err(ConfigError::EmptyRegistryIdentifier { field: "column" });
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: String::new(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            db_connect_retries: default_db_connect_retries(),
            initializer: InitializerSettings::default(),
            registry: RegistrySettings::default(),
        }
    }
}

impl AppConfig {
    /// Connection pool settings applied to the master and every tenant connection.
    pub fn db_settings(&self) -> DbSettings {
        DbSettings {
            max_connections: self.db_max_connections,
            acquire_timeout_ms: self.db_acquire_timeout_ms,
            connect_retries: self.db_connect_retries,
        }
    }

    /// Builds the explicit initializer configuration from the loaded settings.
    pub fn initializer_config(&self) -> InitializerConfig {
        InitializerConfig {
            master_connection_string: self.database_url.clone(),
            for_master: self.initializer.for_master,
            enable_seeding: self.initializer.enable_seeding,
            registry: self.registry.clone(),
            db: self.db_settings(),
        }
    }

    /// Returns a redacted JSON representation (credentials are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        config.database_url = redact_connection_string(&config.database_url);
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error if required settings are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections {
                value: self.db_max_connections,
            });
        }

        if self.db_connect_retries == 0 {
            return Err(ConfigError::InvalidConnectRetries {
                value: self.db_connect_retries,
            });
        }

        if !matches!(self.log_format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidLogFormat {
                value: self.log_format.clone(),
            });
        }

        self.registry.validate()?;

        Ok(())
    }
}

/// Masks the password of a URL-shaped connection string.
///
/// Strings that do not parse as URLs (e.g. `sqlite::memory:`) carry no
/// credentials and are returned unchanged.
pub fn redact_connection_string(value: &str) -> String {
    match Url::parse(value) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("[REDACTED]")).is_err() {
                return "[REDACTED]".to_string();
            }
            url.to_string()
        }
        _ => value.to_string(),
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_db_connect_retries() -> u32 {
    3
}

fn default_registry_table() -> String {
    "tenants".to_string()
}

fn default_registry_column() -> String {
    "connection_string".to_string()
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("master connection string is missing; set EMPLOYEES_DATABASE_URL")]
    MissingDatabaseUrl,
    #[error("invalid boolean for {key}: '{value}'")]
    InvalidBool { key: String, value: String },
    #[error("invalid number for {key}: '{value}'")]
    InvalidNumber { key: String, value: String },
    #[error("db max connections must be at least 1, got {value}")]
    InvalidMaxConnections { value: u32 },
    #[error("db connect retries must be at least 1, got {value}")]
    InvalidConnectRetries { value: u32 },
    #[error("log format must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat { value: String },
    #[error("tenant registry {field} cannot be empty")]
    EmptyRegistryIdentifier { field: &'static str },
}

/// Loads configuration using layered `.env` files and `EMPLOYEES_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = take_string(&mut layered, "PROFILE").unwrap_or(profile_hint);
        let log_level = take_string(&mut layered, "LOG_LEVEL").unwrap_or_else(default_log_level);
        let log_format =
            take_string(&mut layered, "LOG_FORMAT").unwrap_or_else(default_log_format);
        let database_url = take_string(&mut layered, "DATABASE_URL").unwrap_or_default();
        let db_max_connections = take_number(&mut layered, "DB_MAX_CONNECTIONS")?
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = take_number(&mut layered, "DB_ACQUIRE_TIMEOUT_MS")?
            .unwrap_or_else(default_db_acquire_timeout_ms);
        let db_connect_retries = take_number(&mut layered, "DB_CONNECT_RETRIES")?
            .unwrap_or_else(default_db_connect_retries);

        let initializer = InitializerSettings {
            for_master: take_bool(&mut layered, "INITIALIZER_FOR_MASTER")?.unwrap_or(false),
            enable_seeding: take_bool(&mut layered, "INITIALIZER_ENABLE_SEEDING")?
                .unwrap_or(false),
        };

        let registry = RegistrySettings {
            table: take_string(&mut layered, "REGISTRY_TABLE")
                .unwrap_or_else(default_registry_table),
            column: take_string(&mut layered, "REGISTRY_COLUMN")
                .unwrap_or_else(default_registry_column),
        };

        let config = AppConfig {
            profile,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            db_connect_retries,
            initializer,
            registry,
        };

        config.validate()?;

        Ok(config)
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn take_string(values: &mut BTreeMap<String, String>, key: &str) -> Option<String> {
    values
        .remove(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn take_number<T: std::str::FromStr>(
    values: &mut BTreeMap<String, String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match take_string(values, key) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| ConfigError::InvalidNumber {
            key: format!("{ENV_PREFIX}{key}"),
            value: raw,
        }),
    }
}

fn take_bool(values: &mut BTreeMap<String, String>, key: &str) -> Result<Option<bool>, ConfigError> {
    match take_string(values, key) {
        None => Ok(None),
        Some(raw) => parse_bool(&raw).map(Some).ok_or(ConfigError::InvalidBool {
            key: format!("{ENV_PREFIX}{key}"),
            value: raw,
        }),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
