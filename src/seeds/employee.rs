//! Employee seeding functionality
//!
//! Seeding fires only when it is enabled and the table holds no rows at the
//! time of the check. Once any row exists, seeded or not, it never fires again.

use sea_orm::sea_query::{Alias, Asterisk, Expr, Query, SimpleExpr};
use sea_orm::{ConnectionTrait, DbErr};

use crate::error::ReconcileError;
use crate::reconciler::ReconciledTable;
use crate::schema::{ACTIVE, CREATED_BY, EMAIL, FIRST_NAME, LAST_NAME, NAME};

/// Author recorded on seeded rows.
pub const SEED_AUTHOR: &str = "system";

/// What the seeding step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { rows: u64 },
    AlreadyPopulated { existing: u64 },
    Disabled,
}

/// A baseline employee row. Timestamps come from the column defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEmployee {
    pub name: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
}

pub fn baseline_employees() -> [SeedEmployee; 2] {
    [
        SeedEmployee {
            name: "Initial Employee 1",
            first_name: "Initial",
            last_name: "Employee 1",
            email: "employee1@example.com",
        },
        SeedEmployee {
            name: "Initial Employee 2",
            first_name: "Initial",
            last_name: "Employee 2",
            email: "employee2@example.com",
        },
    ]
}

/// Seeds the reconciled table with the baseline employees if enabled and the
/// table is empty.
///
/// Rows are written through the stored table and column names.
pub async fn seed_employees<C>(
    conn: &C,
    target: &ReconciledTable,
    enabled: bool,
) -> Result<SeedOutcome, ReconcileError>
where
    C: ConnectionTrait,
{
    if !enabled {
        return Ok(SeedOutcome::Disabled);
    }

    let table = target.table_name.as_str();
    let columns = &target.columns;

    let seed_err = |source| ReconcileError::Seed {
        table: table.to_string(),
        source,
    };

    let existing = count_rows(conn, table).await.map_err(seed_err)?;
    if existing > 0 {
        log::debug!("Table {} already holds {} row(s), skipping seed", table, existing);
        return Ok(SeedOutcome::AlreadyPopulated { existing });
    }

    let backend = conn.get_database_backend();
    let mut insert = Query::insert();
    insert.into_table(Alias::new(table)).columns(
        [ACTIVE, CREATED_BY, NAME, FIRST_NAME, LAST_NAME, EMAIL]
            .map(|column| Alias::new(columns.get(column))),
    );
    for employee in baseline_employees() {
        let row: [SimpleExpr; 6] = [
            true.into(),
            SEED_AUTHOR.into(),
            employee.name.into(),
            employee.first_name.into(),
            employee.last_name.into(),
            employee.email.into(),
        ];
        insert
            .values(row)
            .map_err(|e| seed_err(DbErr::Custom(e.to_string())))?;
    }

    let result = conn.execute(backend.build(&insert)).await.map_err(seed_err)?;
    let rows = result.rows_affected();
    log::info!("Seeded {} baseline employee(s) into {}", rows, table);

    Ok(SeedOutcome::Seeded { rows })
}

/// Counts the rows of `table`.
pub async fn count_rows<C>(conn: &C, table: &str) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let backend = conn.get_database_backend();
    let query = Query::select()
        .expr_as(Expr::col(Asterisk).count(), Alias::new("row_count"))
        .from(Alias::new(table))
        .to_owned();

    let row = conn
        .query_one(backend.build(&query))
        .await?
        .ok_or_else(|| DbErr::Custom(format!("row count of {table} returned nothing")))?;
    let count: i64 = row.try_get("", "row_count")?;

    Ok(u64::try_from(count).unwrap_or_default())
}
