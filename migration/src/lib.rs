//! Database migrations for the master database.
//!
//! The master database owns the tenant registry that the employees table
//! initializer reads to discover tenant connection strings.

pub use sea_orm_migration::prelude::*;

mod m2025_11_10_090000_create_tenant_registry;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m2025_11_10_090000_create_tenant_registry::Migration)]
    }
}
