//! # Tenant Connection Discovery
//!
//! Reads tenant connection strings from the registry table in the master
//! database. Reachability is not checked here; that happens when each tenant
//! is reconciled.

use sea_orm::sea_query::{Alias, Query};
use sea_orm::{ConnectionTrait, DbErr};

use crate::config::RegistrySettings;

/// Returns one connection string per registry row, skipping NULL and blank values.
///
/// An empty registry yields an empty list.
pub async fn discover_tenant_connections<C>(
    master: &C,
    registry: &RegistrySettings,
) -> Result<Vec<String>, DbErr>
where
    C: ConnectionTrait,
{
    let backend = master.get_database_backend();
    let query = Query::select()
        .column(Alias::new(&registry.column))
        .from(Alias::new(&registry.table))
        .to_owned();

    let rows = master.query_all(backend.build(&query)).await?;
    let values = rows
        .iter()
        .map(|row| row.try_get::<Option<String>>("", &registry.column))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(usable_connection_strings(values))
}

/// Drops absent and whitespace-only values, trimming the rest.
pub fn usable_connection_strings<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    values
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_missing_values_are_skipped() {
        let values = vec![
            Some("sqlite://tenant-a.db".to_string()),
            None,
            Some(String::new()),
            Some("   ".to_string()),
            Some(" postgres://db/tenant-b ".to_string()),
        ];
        assert_eq!(
            usable_connection_strings(values),
            vec![
                "sqlite://tenant-a.db".to_string(),
                "postgres://db/tenant-b".to_string()
            ]
        );
    }

    #[test]
    fn empty_registry_yields_nothing() {
        assert!(usable_connection_strings(Vec::new()).is_empty());
    }
}
