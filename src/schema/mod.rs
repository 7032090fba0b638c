//! # Target Schema
//!
//! The canonical shape of the `Employees` table and the DDL statements that
//! create it or add a single missing column to it.

use sea_orm::DatabaseBackend;
use sea_orm::sea_query::{
    Alias, ColumnDef, Expr, SimpleExpr, Table, TableAlterStatement, TableCreateStatement,
};

pub mod catalog;

/// Name of the table the initializer manages.
pub const EMPLOYEES_TABLE: &str = "Employees";

pub const ID: &str = "Id";
pub const ACTIVE: &str = "Active";
pub const CREATED_AT: &str = "CreatedAt";
pub const CREATED_BY: &str = "CreatedBy";
pub const NAME: &str = "Name";
pub const FIRST_NAME: &str = "FirstName";
pub const LAST_NAME: &str = "LastName";
pub const CREATED: &str = "Created";
pub const EMAIL: &str = "Email";

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// 64-bit integer assigned by the storage engine; always the primary key.
    Identity,
    Boolean,
    TimestampWithOffset,
    VarChar(u32),
    Text,
}

/// Default expression of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    None,
    Bool(bool),
    CurrentTimestamp,
    CurrentDate,
}

/// Which statement a column definition is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlContext {
    CreateTable,
    AddColumn,
}

/// One column of the target schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub default: DefaultValue,
}

/// Target schema, in declaration order.
pub const TARGET_COLUMNS: [ColumnSpec; 9] = [
    ColumnSpec {
        name: ID,
        kind: ColumnKind::Identity,
        nullable: false,
        default: DefaultValue::None,
    },
    ColumnSpec {
        name: ACTIVE,
        kind: ColumnKind::Boolean,
        nullable: true,
        default: DefaultValue::Bool(true),
    },
    ColumnSpec {
        name: CREATED_AT,
        kind: ColumnKind::TimestampWithOffset,
        nullable: true,
        default: DefaultValue::CurrentTimestamp,
    },
    ColumnSpec {
        name: CREATED_BY,
        kind: ColumnKind::VarChar(255),
        nullable: true,
        default: DefaultValue::None,
    },
    ColumnSpec {
        name: NAME,
        kind: ColumnKind::Text,
        nullable: true,
        default: DefaultValue::None,
    },
    ColumnSpec {
        name: FIRST_NAME,
        kind: ColumnKind::VarChar(255),
        nullable: true,
        default: DefaultValue::None,
    },
    ColumnSpec {
        name: LAST_NAME,
        kind: ColumnKind::VarChar(255),
        nullable: true,
        default: DefaultValue::None,
    },
    ColumnSpec {
        name: CREATED,
        kind: ColumnKind::TimestampWithOffset,
        nullable: true,
        default: DefaultValue::CurrentDate,
    },
    ColumnSpec {
        name: EMAIL,
        kind: ColumnKind::VarChar(254),
        nullable: true,
        default: DefaultValue::None,
    },
];

impl ColumnSpec {
    pub fn is_primary_key(&self) -> bool {
        matches!(self.kind, ColumnKind::Identity)
    }

    /// Builds the column definition for `backend`.
    pub fn column_def(&self, backend: DatabaseBackend, context: DdlContext) -> ColumnDef {
        let mut def = ColumnDef::new(Alias::new(self.name));
        match self.kind {
            ColumnKind::Identity => {
                def.big_integer().not_null().auto_increment().primary_key();
            }
            ColumnKind::Boolean => {
                def.boolean();
            }
            ColumnKind::TimestampWithOffset => {
                def.timestamp_with_time_zone();
            }
            ColumnKind::VarChar(len) => {
                def.string_len(len);
            }
            ColumnKind::Text => {
                def.text();
            }
        }

        if !self.is_primary_key() {
            if self.nullable {
                def.null();
            } else {
                def.not_null();
            }
        }

        if let Some(expr) = self.default_expr(backend, context) {
            def.default(expr);
        }

        def
    }

    fn default_expr(&self, backend: DatabaseBackend, context: DdlContext) -> Option<SimpleExpr> {
        // SQLite rejects non-constant defaults in ALTER TABLE ... ADD COLUMN.
        let time_defaults_allowed =
            !(backend == DatabaseBackend::Sqlite && context == DdlContext::AddColumn);

        match self.default {
            DefaultValue::None => None,
            DefaultValue::Bool(value) => Some(Expr::val(value).into()),
            DefaultValue::CurrentTimestamp if time_defaults_allowed => {
                Some(Expr::current_timestamp().into())
            }
            DefaultValue::CurrentDate if time_defaults_allowed => match backend {
                DatabaseBackend::Sqlite => Some(Expr::cust("(datetime('now', 'start of day'))")),
                _ => Some(Expr::current_date().into()),
            },
            DefaultValue::CurrentTimestamp | DefaultValue::CurrentDate => None,
        }
    }
}

/// `CREATE TABLE IF NOT EXISTS` with every target column and `Id` as primary key.
pub fn create_table_statement(table: &str, backend: DatabaseBackend) -> TableCreateStatement {
    let mut stmt = Table::create();
    stmt.table(Alias::new(table)).if_not_exists();
    for column in &TARGET_COLUMNS {
        stmt.col(column.column_def(backend, DdlContext::CreateTable));
    }
    stmt
}

/// `ALTER TABLE ... ADD COLUMN` for exactly one target column.
pub fn add_column_statement(
    table: &str,
    column: &ColumnSpec,
    backend: DatabaseBackend,
) -> TableAlterStatement {
    Table::alter()
        .table(Alias::new(table))
        .add_column(column.column_def(backend, DdlContext::AddColumn))
        .to_owned()
}

/// Stored spelling of every target column on one table, in target order.
///
/// Postgres treats quoted identifiers as case-sensitive, so statements against
/// a table that predates the target schema must use the names it actually has.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredColumns {
    names: Vec<String>,
}

impl StoredColumns {
    /// Names of a table built from the target schema.
    pub fn canonical() -> Self {
        Self {
            names: TARGET_COLUMNS.iter().map(|c| c.name.to_string()).collect(),
        }
    }

    /// Matches each target column against `existing`. An exact match wins over
    /// a case-insensitive one; absent columns keep the target spelling.
    pub fn resolve(existing: &[String]) -> Self {
        let names = TARGET_COLUMNS
            .iter()
            .map(|column| {
                existing
                    .iter()
                    .find(|name| name.as_str() == column.name)
                    .or_else(|| {
                        existing
                            .iter()
                            .find(|name| name.eq_ignore_ascii_case(column.name))
                    })
                    .cloned()
                    .unwrap_or_else(|| column.name.to_string())
            })
            .collect();
        Self { names }
    }

    /// Stored name of target column `column`. Unknown names pass through.
    pub fn get<'a>(&'a self, column: &'a str) -> &'a str {
        TARGET_COLUMNS
            .iter()
            .position(|c| c.name == column)
            .and_then(|index| self.names.get(index))
            .map_or(column, String::as_str)
    }
}

impl Default for StoredColumns {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Target columns absent from `existing`, compared case-insensitively.
pub fn missing_columns(existing: &[String]) -> Vec<&'static ColumnSpec> {
    TARGET_COLUMNS
        .iter()
        .filter(|column| {
            !existing
                .iter()
                .any(|name| name.eq_ignore_ascii_case(column.name))
        })
        .collect()
}
