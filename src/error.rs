//! # Error Handling
//!
//! Error taxonomy for the employees table initializer and the employee
//! repositories. Per-target reconciliation failures are values carried in the
//! batch report, never panics or propagated errors.

use sea_orm::{DatabaseBackend, DbErr};
use thiserror::Error;

use crate::db::DatabaseError;

/// Broad class of a per-target failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The target (or the master, during discovery) could not be reached.
    Connectivity,
    /// A DDL/DML statement failed against a reachable target.
    Statement,
}

/// Failure of one target's reconcile+seed pipeline.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("cannot connect to target: {0}")]
    Connection(#[from] DatabaseError),

    #[error("cannot read tenant registry {table}.{column}: {source}")]
    Discovery {
        table: String,
        column: String,
        source: DbErr,
    },

    #[error("catalog inspection of table {table} failed: {source}")]
    Catalog { table: String, source: DbErr },

    #[error("creating table {table} failed: {source}")]
    CreateTable { table: String, source: DbErr },

    #[error("transaction on table {table} failed: {source}")]
    Transaction { table: String, source: DbErr },

    #[error("adding column {column} to table {table} failed: {source}")]
    AddColumn {
        table: String,
        column: String,
        source: DbErr,
    },

    #[error("seeding table {table} failed: {source}")]
    Seed { table: String, source: DbErr },

    #[error("database backend {backend:?} is not supported")]
    UnsupportedBackend { backend: DatabaseBackend },
}

impl ReconcileError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReconcileError::Connection(_) | ReconcileError::Discovery { .. } => {
                FailureKind::Connectivity
            }
            ReconcileError::Catalog { .. }
            | ReconcileError::CreateTable { .. }
            | ReconcileError::Transaction { .. }
            | ReconcileError::AddColumn { .. }
            | ReconcileError::Seed { .. }
            | ReconcileError::UnsupportedBackend { .. } => FailureKind::Statement,
        }
    }
}

/// Errors returned by the employee repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("employee {id} not found")]
    NotFound { id: i64 },

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}
