//! Employee repository running hand-written SQL over the raw connection.
//!
//! Values always travel as bound parameters. Identifiers come from the
//! reconciled table (stored table and column names) and the sort whitelist,
//! never from caller input.

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, FromQueryResult, Statement, Value,
};
use std::sync::Arc;

use super::{EmployeeChanges, EmployeeRepository, NewEmployee, Page, PageRequest};
use crate::error::RepositoryError;
use crate::models::employee;
use crate::reconciler::ReconciledTable;
use crate::schema::{
    ACTIVE, CREATED_BY, EMAIL, EMPLOYEES_TABLE, FIRST_NAME, ID, LAST_NAME, NAME, StoredColumns,
    TARGET_COLUMNS,
};

/// Repository for employee database operations through raw statements
#[derive(Debug, Clone)]
pub struct SqlEmployeeRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
    table: String,
    columns: StoredColumns,
}

impl SqlEmployeeRepository {
    /// Repository over the canonical `Employees` table.
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            table: EMPLOYEES_TABLE.to_string(),
            columns: StoredColumns::canonical(),
        }
    }

    /// Repository over a reconciled table, addressed by its stored names.
    pub fn for_table(db: Arc<DatabaseConnection>, target: &ReconciledTable) -> Self {
        Self {
            db,
            table: target.table_name.clone(),
            columns: target.columns.clone(),
        }
    }

    fn backend(&self) -> DatabaseBackend {
        self.db.get_database_backend()
    }

    fn table(&self) -> String {
        quote(&self.table)
    }

    fn column(&self, name: &str) -> String {
        quote(self.columns.get(name))
    }

    /// Every target column, aliased to the entity's column names.
    fn select_list(&self) -> String {
        TARGET_COLUMNS
            .iter()
            .map(|c| format!("{} AS {}", self.column(c.name), quote(c.name)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Double-quoted identifier; embedded quotes are doubled.
fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// Positional placeholder `n` (1-based) for `backend`.
fn placeholder(backend: DatabaseBackend, n: usize) -> String {
    match backend {
        DatabaseBackend::Postgres => format!("${n}"),
        _ => "?".to_string(),
    }
}

fn placeholders(backend: DatabaseBackend, count: usize) -> String {
    (1..=count)
        .map(|n| placeholder(backend, n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl EmployeeRepository for SqlEmployeeRepository {
    async fn create(&self, new: NewEmployee) -> Result<employee::Model, RepositoryError> {
        let backend = self.backend();
        let columns = [ACTIVE, CREATED_BY, NAME, FIRST_NAME, LAST_NAME, EMAIL]
            .map(|column| self.column(column))
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({columns}) VALUES ({}) RETURNING {} AS {}",
            self.table(),
            placeholders(backend, 6),
            self.column(ID),
            quote(ID)
        );
        let values: Vec<Value> = vec![
            Some(new.active.unwrap_or(true)).into(),
            new.created_by.into(),
            new.name.into(),
            new.first_name.into(),
            new.last_name.into(),
            new.email.into(),
        ];

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(backend, sql, values))
            .await?
            .ok_or(DbErr::RecordNotInserted)?;
        let id: i64 = row.try_get("", ID)?;

        self.find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound { id })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<employee::Model>, RepositoryError> {
        let backend = self.backend();
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = {}",
            self.select_list(),
            self.table(),
            self.column(ID),
            placeholder(backend, 1)
        );

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(backend, sql, [id.into()]))
            .await?;

        match row {
            Some(row) => Ok(Some(employee::Model::from_query_result(&row, "")?)),
            None => Ok(None),
        }
    }

    async fn update(
        &self,
        id: i64,
        changes: EmployeeChanges,
    ) -> Result<employee::Model, RepositoryError> {
        let backend = self.backend();

        let mut assignments: Vec<(&str, Value)> = Vec::new();
        if let Some(active) = changes.active {
            assignments.push((ACTIVE, active.into()));
        }
        if let Some(name) = changes.name {
            assignments.push((NAME, name.into()));
        }
        if let Some(first_name) = changes.first_name {
            assignments.push((FIRST_NAME, first_name.into()));
        }
        if let Some(last_name) = changes.last_name {
            assignments.push((LAST_NAME, last_name.into()));
        }
        if let Some(email) = changes.email {
            assignments.push((EMAIL, email.into()));
        }

        if assignments.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or(RepositoryError::NotFound { id });
        }

        let set_clause = assignments
            .iter()
            .enumerate()
            .map(|(i, (column, _))| {
                format!("{} = {}", self.column(column), placeholder(backend, i + 1))
            })
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {set_clause} WHERE {} = {}",
            self.table(),
            self.column(ID),
            placeholder(backend, assignments.len() + 1)
        );

        let mut values: Vec<Value> = assignments.into_iter().map(|(_, value)| value).collect();
        values.push(id.into());

        let result = self
            .db
            .execute(Statement::from_sql_and_values(backend, sql, values))
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { id });
        }

        self.find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound { id })
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let backend = self.backend();
        let sql = format!(
            "DELETE FROM {} WHERE {} = {}",
            self.table(),
            self.column(ID),
            placeholder(backend, 1)
        );

        let result = self
            .db
            .execute(Statement::from_sql_and_values(backend, sql, [id.into()]))
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { id });
        }
        Ok(())
    }

    async fn list(&self, request: PageRequest) -> Result<Page<employee::Model>, RepositoryError> {
        let backend = self.backend();
        let request = request.normalized();

        let total_row = self
            .db
            .query_one(Statement::from_string(
                backend,
                format!(r#"SELECT COUNT(*) AS "total" FROM {}"#, self.table()),
            ))
            .await?;
        let total = match total_row {
            Some(row) => u64::try_from(row.try_get::<i64>("", "total")?).unwrap_or_default(),
            None => 0,
        };

        let direction = request.direction.keyword();
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {} {direction}, {} {direction} LIMIT {} OFFSET {}",
            self.select_list(),
            self.table(),
            self.column(request.sort.column_name()),
            self.column(ID),
            placeholder(backend, 1),
            placeholder(backend, 2)
        );
        let limit = i64::try_from(request.page_size).unwrap_or(i64::MAX);
        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);

        let rows = self
            .db
            .query_all(Statement::from_sql_and_values(
                backend,
                sql,
                [limit.into(), offset.into()],
            ))
            .await?;
        let items = rows
            .iter()
            .map(|row| employee::Model::from_query_result(row, ""))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_follow_backend_style() {
        assert_eq!(placeholders(DatabaseBackend::Postgres, 3), "$1, $2, $3");
        assert_eq!(placeholders(DatabaseBackend::Sqlite, 2), "?, ?");
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote("Name"), "\"Name\"");
        assert_eq!(quote("odd\"name"), "\"odd\"\"name\"");
    }
}
