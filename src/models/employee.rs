//! Employee entity model
//!
//! SeaORM entity mapped onto the `Employees` table the initializer manages.
//! Column names keep the table's PascalCase spelling.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Employee record
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "Employees")]
pub struct Model {
    /// Identifier assigned by the storage engine (primary key)
    #[sea_orm(primary_key, column_name = "Id")]
    pub id: i64,

    #[sea_orm(column_name = "Active")]
    pub active: Option<bool>,

    /// Server time at insertion
    #[sea_orm(column_name = "CreatedAt")]
    pub created_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(column_name = "CreatedBy")]
    pub created_by: Option<String>,

    /// Display name
    #[sea_orm(column_name = "Name", column_type = "Text", nullable)]
    pub name: Option<String>,

    #[sea_orm(column_name = "FirstName")]
    pub first_name: Option<String>,

    #[sea_orm(column_name = "LastName")]
    pub last_name: Option<String>,

    /// Server date at insertion
    #[sea_orm(column_name = "Created")]
    pub created: Option<DateTimeWithTimeZone>,

    #[sea_orm(column_name = "Email")]
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
