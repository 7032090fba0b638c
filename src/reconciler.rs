//! # Schema Reconciler
//!
//! Brings one database's `Employees` table into conformance with the target
//! schema. Reconciliation is strictly additive: a missing table is created,
//! missing columns are added, and nothing that already exists is touched.

use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

use crate::error::ReconcileError;
use crate::schema::{self, StoredColumns, catalog};

/// What reconciliation did to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAction {
    /// The table was missing and has been created with the full schema.
    Created,
    /// The table existed; `added_columns` is empty when it already conformed.
    Reconciled { added_columns: Vec<String> },
}

/// Result of reconciling one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledTable {
    /// Table name as stored in the catalog.
    pub table_name: String,
    /// Column names as stored, for statements that follow reconciliation.
    pub columns: StoredColumns,
    pub action: TableAction,
}


/// Ensures `table` exists on `conn` with every target column.
///
/// Missing columns are added inside one transaction; the first failing
/// column aborts the target and rolls back the additions made in this run.
pub async fn reconcile(
    conn: &DatabaseConnection,
    table: &str,
) -> Result<ReconciledTable, ReconcileError> {
    let backend = conn.get_database_backend();
    if !catalog::is_supported(backend) {
        return Err(ReconcileError::UnsupportedBackend { backend });
    }

    let existing = catalog::find_table(conn, table)
        .await
        .map_err(|source| ReconcileError::Catalog {
            table: table.to_string(),
            source,
        })?;

    match existing {
        None => {
            let stmt = schema::create_table_statement(table, backend);
            conn.execute(backend.build(&stmt))
                .await
                .map_err(|source| ReconcileError::CreateTable {
                    table: table.to_string(),
                    source,
                })?;
            tracing::info!(table, "created table");
            Ok(ReconciledTable {
                table_name: table.to_string(),
                columns: StoredColumns::canonical(),
                action: TableAction::Created,
            })
        }
        Some(stored) => {
            let (added_columns, columns) = add_missing_columns(conn, &stored).await?;
            Ok(ReconciledTable {
                table_name: stored,
                columns,
                action: TableAction::Reconciled { added_columns },
            })
        }
    }
}

async fn add_missing_columns(
    conn: &DatabaseConnection,
    table: &str,
) -> Result<(Vec<String>, StoredColumns), ReconcileError> {
    let backend = conn.get_database_backend();
    let txn_err = |source| ReconcileError::Transaction {
        table: table.to_string(),
        source,
    };

    let txn = conn.begin().await.map_err(txn_err)?;

    let mut existing = catalog::list_columns(&txn, table)
        .await
        .map_err(|source| ReconcileError::Catalog {
            table: table.to_string(),
            source,
        })?;

    let mut added = Vec::new();
    for column in schema::missing_columns(&existing) {
        let stmt = schema::add_column_statement(table, column, backend);
        txn.execute(backend.build(&stmt))
            .await
            .map_err(|source| ReconcileError::AddColumn {
                table: table.to_string(),
                column: column.name.to_string(),
                source,
            })?;
        added.push(column.name.to_string());
    }

    txn.commit().await.map_err(txn_err)?;

    for column in &added {
        tracing::info!(table, column = %column, "added missing column");
    }

    existing.extend(added.iter().cloned());
    Ok((added, StoredColumns::resolve(&existing)))
}
