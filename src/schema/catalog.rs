//! Catalog inspection.
//!
//! Table and column existence is re-derived from the storage engine's catalog
//! on every run; nothing records which reconciliation steps already happened.

use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement, Value};

/// Returns whether the initializer knows how to inspect and alter `backend`.
pub fn is_supported(backend: DatabaseBackend) -> bool {
    matches!(backend, DatabaseBackend::Postgres | DatabaseBackend::Sqlite)
}

/// Looks up `name` case-insensitively and returns the name as stored.
///
/// An exact match wins over a case-insensitive one.
pub async fn find_table<C>(conn: &C, name: &str) -> Result<Option<String>, DbErr>
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    let sql = match backend {
        DatabaseBackend::Postgres => {
            "SELECT table_name::text AS table_name \
             FROM information_schema.tables \
             WHERE table_schema = current_schema() \
               AND lower(table_name::text) = lower($1) \
             ORDER BY (table_name::text = $1) DESC \
             LIMIT 1"
        }
        DatabaseBackend::Sqlite => {
            "SELECT name AS table_name \
             FROM sqlite_master \
             WHERE type = 'table' AND lower(name) = lower(?) \
             ORDER BY (name = ?) DESC \
             LIMIT 1"
        }
        other => return Err(unsupported(other)),
    };

    let values: Vec<Value> = match backend {
        DatabaseBackend::Sqlite => vec![name.into(), name.into()],
        _ => vec![name.into()],
    };

    let row = conn
        .query_one(Statement::from_sql_and_values(backend, sql, values))
        .await?;

    match row {
        Some(row) => Ok(Some(row.try_get::<String>("", "table_name")?)),
        None => Ok(None),
    }
}

/// Lists the column names of `table`, which must be the stored table name.
pub async fn list_columns<C>(conn: &C, table: &str) -> Result<Vec<String>, DbErr>
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    let sql = match backend {
        DatabaseBackend::Postgres => {
            "SELECT column_name::text AS column_name \
             FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 \
             ORDER BY ordinal_position"
        }
        DatabaseBackend::Sqlite => "SELECT name AS column_name FROM pragma_table_info(?) ORDER BY cid",
        other => return Err(unsupported(other)),
    };

    let rows = conn
        .query_all(Statement::from_sql_and_values(
            backend,
            sql,
            vec![table.into()],
        ))
        .await?;

    rows.iter()
        .map(|row| row.try_get::<String>("", "column_name"))
        .collect()
}

fn unsupported(backend: DatabaseBackend) -> DbErr {
    DbErr::Custom(format!("catalog inspection is not supported on {backend:?}"))
}
