//! Test utilities for database testing.
//!
//! Every test gets its own temporary directory of file-backed SQLite
//! databases, so master and tenant databases never share state.

use anyhow::Result;
use employees::db::{self, DbSettings};
use employees::schema::{EMPLOYEES_TABLE, catalog};
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::{Alias, Query};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use tempfile::TempDir;
use uuid::Uuid;

#[allow(dead_code)]
pub mod employee_scenarios;

/// Connection settings that fail fast on unreachable targets.
#[allow(dead_code)]
pub fn fast_settings() -> DbSettings {
    DbSettings {
        max_connections: 1,
        acquire_timeout_ms: 2000,
        connect_retries: 1,
    }
}

/// Returns a connection string for a SQLite database file inside `dir`.
#[allow(dead_code)]
pub fn sqlite_url(dir: &TempDir, name: &str) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join(name).display())
}

/// Opens a connection to `url`.
#[allow(dead_code)]
pub async fn open(url: &str) -> Result<DatabaseConnection> {
    Ok(db::connect(url, &fast_settings()).await?)
}

/// Creates a master database with the tenant registry migration applied.
#[allow(dead_code)]
pub async fn setup_master(dir: &TempDir) -> Result<(String, DatabaseConnection)> {
    let url = sqlite_url(dir, "master.db");
    let db = open(&url).await?;
    Migrator::up(&db, None).await?;
    Ok((url, db))
}

/// Inserts a tenant registry row with the given connection string.
#[allow(dead_code)]
pub async fn register_tenant(
    db: &DatabaseConnection,
    name: &str,
    connection_string: Option<&str>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let insert = Query::insert()
        .into_table(Alias::new("tenants"))
        .columns([
            Alias::new("id"),
            Alias::new("name"),
            Alias::new("connection_string"),
        ])
        .values_panic([
            id.into(),
            name.into(),
            connection_string.map(str::to_string).into(),
        ])
        .to_owned();
    db.execute(db.get_database_backend().build(&insert)).await?;
    Ok(id)
}

/// Executes a raw SQL string.
#[allow(dead_code)]
pub async fn exec(db: &DatabaseConnection, sql: &str) -> Result<()> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_string()))
        .await?;
    Ok(())
}

/// Column names of `table`, in declaration order.
#[allow(dead_code)]
pub async fn column_names(db: &DatabaseConnection, table: &str) -> Result<Vec<String>> {
    Ok(catalog::list_columns(db, table).await?)
}

/// Whether the employees table exists.
#[allow(dead_code)]
pub async fn employees_table_exists(db: &DatabaseConnection) -> Result<bool> {
    Ok(catalog::find_table(db, EMPLOYEES_TABLE).await?.is_some())
}

/// Names stored in the employees table, sorted.
#[allow(dead_code)]
pub async fn employee_names(db: &DatabaseConnection) -> Result<Vec<String>> {
    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            r#"SELECT "Name" FROM "Employees" ORDER BY "Name""#.to_string(),
        ))
        .await?;
    let mut names = Vec::with_capacity(rows.len());
    for row in rows {
        names.push(row.try_get::<String>("", "Name")?);
    }
    Ok(names)
}
