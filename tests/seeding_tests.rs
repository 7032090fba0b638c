//! Tests for one-time seeding of the employees table.

use anyhow::Result;
use employees::reconciler::reconcile;
use employees::schema::{EMAIL, EMPLOYEES_TABLE, NAME};
use employees::seeds::{SeedOutcome, seed_employees};
use sea_orm::{ConnectionTrait, Statement};
use tempfile::TempDir;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{employee_names, exec, open, sqlite_url};

#[tokio::test]
async fn empty_table_is_seeded_with_two_employees() -> Result<()> {
    let dir = TempDir::new()?;
    let db = open(&sqlite_url(&dir, "tenant.db")).await?;
    let reconciled = reconcile(&db, EMPLOYEES_TABLE).await?;

    let outcome = seed_employees(&db, &reconciled, true).await?;
    assert_eq!(outcome, SeedOutcome::Seeded { rows: 2 });
    assert_eq!(
        employee_names(&db).await?,
        vec!["Initial Employee 1".to_string(), "Initial Employee 2".to_string()]
    );

    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            r#"SELECT "FirstName", "LastName", "Email", "CreatedBy", "Active",
                      "CreatedAt" IS NOT NULL AS "has_created_at",
                      "Created" IS NOT NULL AS "has_created"
               FROM "Employees" WHERE "Name" = 'Initial Employee 2'"#
                .to_string(),
        ))
        .await?
        .expect("seeded row");
    assert_eq!(row.try_get::<String>("", "FirstName")?, "Initial");
    assert_eq!(row.try_get::<String>("", "LastName")?, "Employee 2");
    assert_eq!(row.try_get::<String>("", "Email")?, "employee2@example.com");
    assert_eq!(row.try_get::<String>("", "CreatedBy")?, "system");
    assert!(row.try_get::<bool>("", "Active")?);
    assert!(row.try_get::<bool>("", "has_created_at")?);
    assert!(row.try_get::<bool>("", "has_created")?);
    Ok(())
}

#[tokio::test]
async fn disabled_seeding_is_a_no_op() -> Result<()> {
    let dir = TempDir::new()?;
    let db = open(&sqlite_url(&dir, "tenant.db")).await?;
    let reconciled = reconcile(&db, EMPLOYEES_TABLE).await?;

    let outcome = seed_employees(&db, &reconciled, false).await?;
    assert_eq!(outcome, SeedOutcome::Disabled);
    assert!(employee_names(&db).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn seeding_is_skipped_once_rows_exist() -> Result<()> {
    let dir = TempDir::new()?;
    let db = open(&sqlite_url(&dir, "tenant.db")).await?;
    let reconciled = reconcile(&db, EMPLOYEES_TABLE).await?;

    seed_employees(&db, &reconciled, true).await?;
    let second = seed_employees(&db, &reconciled, true).await?;
    assert_eq!(second, SeedOutcome::AlreadyPopulated { existing: 2 });
    assert_eq!(employee_names(&db).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn user_created_row_prevents_seeding() -> Result<()> {
    let dir = TempDir::new()?;
    let db = open(&sqlite_url(&dir, "tenant.db")).await?;
    let reconciled = reconcile(&db, EMPLOYEES_TABLE).await?;
    exec(&db, r#"INSERT INTO "Employees" ("Name") VALUES ('Hand Made')"#).await?;

    let outcome = seed_employees(&db, &reconciled, true).await?;
    assert_eq!(outcome, SeedOutcome::AlreadyPopulated { existing: 1 });
    assert_eq!(employee_names(&db).await?, vec!["Hand Made".to_string()]);
    Ok(())
}

#[tokio::test]
async fn legacy_table_is_seeded_through_its_own_column_names() -> Result<()> {
    let dir = TempDir::new()?;
    let db = open(&sqlite_url(&dir, "tenant.db")).await?;
    exec(
        &db,
        r#"CREATE TABLE "employees" ("id" INTEGER PRIMARY KEY AUTOINCREMENT, "name" TEXT, "email" TEXT)"#,
    )
    .await?;

    let reconciled = reconcile(&db, EMPLOYEES_TABLE).await?;
    assert_eq!(reconciled.columns.get(NAME), "name");
    assert_eq!(reconciled.columns.get(EMAIL), "email");

    let outcome = seed_employees(&db, &reconciled, true).await?;
    assert_eq!(outcome, SeedOutcome::Seeded { rows: 2 });

    let rows = db
        .query_all(Statement::from_string(
            db.get_database_backend(),
            r#"SELECT "name", "email" FROM "employees" ORDER BY "id""#.to_string(),
        ))
        .await?;
    let emails: Vec<String> = rows
        .iter()
        .map(|row| row.try_get::<String>("", "email"))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(emails, vec!["employee1@example.com", "employee2@example.com"]);
    Ok(())
}
