//! # Batch Orchestrator
//!
//! Runs reconcile-then-seed against the master database or against every
//! tenant listed in the master's registry. Targets are processed one after
//! another, each on its own connection. A failing target is logged and
//! recorded in the [`BatchReport`]; it never stops the remaining targets and
//! never surfaces as an error from the batch call.

use sea_orm::DatabaseConnection;

use crate::config::{ConfigError, RegistrySettings, redact_connection_string};
use crate::db::{self, DbSettings};
use crate::error::ReconcileError;
use crate::reconciler::{self, TableAction};
use crate::registry;
use crate::schema::EMPLOYEES_TABLE;
use crate::seeds::{self, SeedOutcome};

/// Explicit configuration of the initializer.
#[derive(Debug, Clone)]
pub struct InitializerConfig {
    pub master_connection_string: String,
    /// Reconcile the master only instead of fanning out to tenants.
    pub for_master: bool,
    pub enable_seeding: bool,
    pub registry: RegistrySettings,
    pub db: DbSettings,
}

impl InitializerConfig {
    /// Configuration with the documented defaults: tenant fan-out, no seeding.
    pub fn new(master_connection_string: impl Into<String>) -> Self {
        Self {
            master_connection_string: master_connection_string.into(),
            for_master: false,
            enable_seeding: false,
            registry: RegistrySettings::default(),
            db: DbSettings::default(),
        }
    }
}

/// Successful pipeline of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub table: TableAction,
    pub seed: SeedOutcome,
}

/// Outcome of one target. `target` is the redacted connection string.
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: String,
    pub result: Result<TargetReport, ReconcileError>,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-target outcomes of one batch call, in processing order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<TargetOutcome>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ReconcileError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.target.as_str(), e)))
    }
}

/// Creates or patches the employees table across the configured targets.
#[derive(Debug, Clone)]
pub struct EmployeeTableInitializer {
    config: InitializerConfig,
}

impl EmployeeTableInitializer {
    /// Fails only when the master connection string is missing.
    pub fn new(config: InitializerConfig) -> Result<Self, ConfigError> {
        if config.master_connection_string.trim().is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        config.registry.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &InitializerConfig {
        &self.config
    }

    /// Dispatches on `for_master`.
    pub async fn run(&self) -> BatchReport {
        if self.config.for_master {
            self.initialize_master().await
        } else {
            self.initialize_tenants().await
        }
    }

    /// Reconciles and seeds the master database only.
    pub async fn initialize_master(&self) -> BatchReport {
        let mut report = BatchReport::default();
        let url = self.config.master_connection_string.clone();
        let outcome = self.initialize_target(&url).await;
        report.outcomes.push(outcome);
        log_summary(&report);
        report
    }

    /// Reconciles and seeds every tenant listed in the master's registry.
    pub async fn initialize_tenants(&self) -> BatchReport {
        let mut report = BatchReport::default();

        match self.discover_tenants().await {
            Ok(tenants) => {
                tracing::info!(tenants = tenants.len(), "discovered tenant databases");
                for connection_string in &tenants {
                    let outcome = self.initialize_target(connection_string).await;
                    report.outcomes.push(outcome);
                }
            }
            Err(err) => {
                let target = redact_connection_string(&self.config.master_connection_string);
                tracing::error!(
                    database = %target,
                    error = %err,
                    "tenant discovery failed"
                );
                report.outcomes.push(TargetOutcome {
                    target,
                    result: Err(err),
                });
            }
        }

        log_summary(&report);
        report
    }

    async fn discover_tenants(&self) -> Result<Vec<String>, ReconcileError> {
        let master = db::connect(&self.config.master_connection_string, &self.config.db).await?;
        let registry = &self.config.registry;
        let result = registry::discover_tenant_connections(&master, registry)
            .await
            .map_err(|source| ReconcileError::Discovery {
                table: registry.table.clone(),
                column: registry.column.clone(),
                source,
            });
        close_quietly(master).await;
        result
    }

    async fn initialize_target(&self, connection_string: &str) -> TargetOutcome {
        let target = redact_connection_string(connection_string);
        let result = self.reconcile_and_seed(connection_string).await;

        match &result {
            Ok(report) => tracing::info!(
                database = %target,
                table = ?report.table,
                seed = ?report.seed,
                "employees table initialized"
            ),
            Err(err) => tracing::error!(
                database = %target,
                kind = ?err.kind(),
                error = %err,
                "employees table initialization failed"
            ),
        }

        TargetOutcome { target, result }
    }

    async fn reconcile_and_seed(
        &self,
        connection_string: &str,
    ) -> Result<TargetReport, ReconcileError> {
        let conn = db::connect(connection_string, &self.config.db).await?;
        let result = self.run_pipeline(&conn).await;
        close_quietly(conn).await;
        result
    }

    async fn run_pipeline(&self, conn: &DatabaseConnection) -> Result<TargetReport, ReconcileError> {
        let reconciled = reconciler::reconcile(conn, EMPLOYEES_TABLE).await?;
        let seed = seeds::seed_employees(conn, &reconciled, self.config.enable_seeding).await?;
        Ok(TargetReport {
            table: reconciled.action,
            seed,
        })
    }
}

async fn close_quietly(conn: DatabaseConnection) {
    if let Err(err) = conn.close().await {
        log::warn!("Failed to close database connection: {}", err);
    }
}

fn log_summary(report: &BatchReport) {
    tracing::info!(
        attempted = report.attempted(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "employees table initialization finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_master_connection_string_is_fatal() {
        let err = EmployeeTableInitializer::new(InitializerConfig::new("  ")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDatabaseUrl));
    }

    #[test]
    fn defaults_fan_out_without_seeding() {
        let config = InitializerConfig::new("sqlite::memory:");
        assert!(!config.for_master);
        assert!(!config.enable_seeding);
        assert!(EmployeeTableInitializer::new(config).is_ok());
    }

    #[test]
    fn report_counts_failures() {
        let report = BatchReport {
            outcomes: vec![
                TargetOutcome {
                    target: "a".to_string(),
                    result: Ok(TargetReport {
                        table: TableAction::Created,
                        seed: SeedOutcome::Disabled,
                    }),
                },
                TargetOutcome {
                    target: "b".to_string(),
                    result: Err(ReconcileError::UnsupportedBackend {
                        backend: sea_orm::DatabaseBackend::MySql,
                    }),
                },
            ],
        };
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        let failures: Vec<&str> = report.failures().map(|(target, _)| target).collect();
        assert_eq!(failures, vec!["b"]);
    }
}
