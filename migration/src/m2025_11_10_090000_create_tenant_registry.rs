//! Creates the tenant registry in the master database.
//!
//! One row per tenant, pointing at the connection string of that tenant's own
//! database. The connection string is nullable; discovery skips such rows.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TenantRegistry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenantRegistry::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TenantRegistry::Name).text().null())
                    .col(
                        ColumnDef::new(TenantRegistry::ConnectionString)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TenantRegistry::RegisteredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TenantRegistry::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TenantRegistry {
    #[sea_orm(iden = "tenants")]
    Table,
    Id,
    Name,
    ConnectionString,
    RegisteredAt,
}
