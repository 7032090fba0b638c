//! Database connection management for the employees table initializer.
//!
//! Every target (master or tenant) gets its own SeaORM connection, opened with
//! the shared [`DbSettings`] and closed once that target is done.

use anyhow::Context;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{AppConfig, redact_connection_string};

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {source}")]
    ConnectionFailed {
        #[from]
        source: DbErr,
    },
    #[error("Invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Pool parameters applied to every connection the initializer opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbSettings {
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
    /// Total connection attempts, including the first one.
    pub connect_retries: u32,
}

impl Default for DbSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout_ms: 5000,
            connect_retries: 3,
        }
    }
}

/// Opens a connection to `url`, retrying with exponential backoff.
///
/// # Examples
///
/// ```no_run
/// use employees::db::{DbSettings, connect};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let db = connect("sqlite::memory:", &DbSettings::default()).await?;
///     // Use the database connection...
///     Ok(())
/// }
/// ```
pub async fn connect(url: &str, settings: &DbSettings) -> Result<DatabaseConnection, DatabaseError> {
    if url.trim().is_empty() {
        return Err(DatabaseError::InvalidConfiguration {
            message: "Database URL cannot be empty".to_string(),
        });
    }

    let mut opt = ConnectOptions::new(url);
    opt.max_connections(settings.max_connections.max(1))
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let target = redact_connection_string(url);
    let max_attempts = settings.connect_retries.max(1);
    let mut retry_delay = Duration::from_millis(100);
    let mut attempt = 1;

    loop {
        match Database::connect(opt.clone()).await {
            Ok(conn) => {
                log::debug!("Connected to {} (attempt {})", target, attempt);
                return Ok(conn);
            }
            Err(e) if attempt >= max_attempts => {
                log::debug!(
                    "Giving up on {} after {} attempt(s): {}",
                    target,
                    attempt,
                    e
                );
                return Err(DatabaseError::ConnectionFailed { source: e });
            }
            Err(e) => {
                log::warn!(
                    "Connection attempt {} to {} failed: {}, retrying in {:?}",
                    attempt,
                    target,
                    e,
                    retry_delay
                );
                sleep(retry_delay).await;
                retry_delay *= 2; // Exponential backoff
                attempt += 1;
            }
        }
    }
}

/// Connects to the master database named by the application configuration.
pub async fn init_pool(cfg: &AppConfig) -> anyhow::Result<DatabaseConnection> {
    Ok(connect(&cfg.database_url, &cfg.db_settings()).await?)
}

/// Health check for the database connection.
///
/// Verifies that the connection is still active by executing a trivial query.
pub async fn health_check(db: &DatabaseConnection) -> anyhow::Result<()> {
    let stmt = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());

    db.query_one(stmt)
        .await
        .context("Database health check failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_url_is_rejected_without_connecting() {
        let result = connect("   ", &DbSettings::default()).await;
        assert!(matches!(
            result,
            Err(DatabaseError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn unsupported_scheme_fails_after_configured_attempts() {
        let settings = DbSettings {
            connect_retries: 1,
            ..DbSettings::default()
        };
        let result = connect("nowhere://tenant-db", &settings).await;
        assert!(matches!(result, Err(DatabaseError::ConnectionFailed { .. })));
    }

    #[tokio::test]
    async fn health_check_passes_on_sqlite() {
        let db = connect("sqlite::memory:", &DbSettings::default())
            .await
            .unwrap();
        health_check(&db).await.unwrap();
    }
}
