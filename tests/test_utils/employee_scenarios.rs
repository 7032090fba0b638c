//! Repository scenarios shared by the SQLite and Postgres suites.
//!
//! Every scenario takes the repository as a trait object so each storage
//! strategy runs the exact same checks.

use anyhow::Result;
use chrono::Utc;
use employees::error::RepositoryError;
use employees::repositories::{
    EmployeeChanges, EmployeeRepository, NewEmployee, PageRequest, SortDirection, SortKey,
};

pub fn new_employee(first: &str, last: &str) -> NewEmployee {
    NewEmployee {
        name: Some(format!("{first} {last}")),
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        email: Some(format!("{}@example.com", first.to_lowercase())),
        created_by: Some("tests".to_string()),
        ..NewEmployee::default()
    }
}

pub async fn create_read_update_delete(repo: &dyn EmployeeRepository) -> Result<()> {
    let created = repo.create(new_employee("Ada", "Lovelace")).await?;
    assert!(created.id > 0);
    assert_eq!(created.active, Some(true));
    assert_eq!(created.name.as_deref(), Some("Ada Lovelace"));
    let created_at = created.created_at.expect("server-assigned timestamp");
    assert!((Utc::now() - created_at.with_timezone(&Utc)).num_minutes().abs() < 5);
    assert!(created.created.is_some());

    let found = repo.find_by_id(created.id).await?.expect("created row");
    assert_eq!(found, created);

    let updated = repo
        .update(
            created.id,
            EmployeeChanges {
                email: Some("ada@analytical.engine".to_string()),
                active: Some(false),
                ..EmployeeChanges::default()
            },
        )
        .await?;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.email.as_deref(), Some("ada@analytical.engine"));
    assert_eq!(updated.active, Some(false));
    assert_eq!(updated.first_name.as_deref(), Some("Ada"));

    let unchanged = repo.update(created.id, EmployeeChanges::default()).await?;
    assert_eq!(unchanged, updated);

    repo.delete(created.id).await?;
    assert!(repo.find_by_id(created.id).await?.is_none());

    assert!(matches!(
        repo.delete(created.id).await,
        Err(RepositoryError::NotFound { .. })
    ));
    assert!(matches!(
        repo.update(created.id, EmployeeChanges::default()).await,
        Err(RepositoryError::NotFound { .. })
    ));
    Ok(())
}

pub async fn paginate_with_whitelisted_sort(repo: &dyn EmployeeRepository) -> Result<()> {
    for (first, last) in [
        ("Carol", "Shaw"),
        ("Alan", "Turing"),
        ("Edsger", "Dijkstra"),
        ("Barbara", "Liskov"),
        ("Donald", "Knuth"),
    ] {
        repo.create(new_employee(first, last)).await?;
    }

    let page = repo
        .list(PageRequest {
            page: 2,
            page_size: 2,
            sort: SortKey::parse("first_name"),
            direction: SortDirection::Desc,
        })
        .await?;
    assert_eq!(page.total, 5);
    assert_eq!(page.page, 2);
    let firsts: Vec<&str> = page
        .items
        .iter()
        .filter_map(|e| e.first_name.as_deref())
        .collect();
    assert_eq!(firsts, vec!["Carol", "Barbara"]);

    // Unknown sort keys fall back to Id ordering.
    let page = repo
        .list(PageRequest {
            page: 1,
            page_size: 10,
            sort: SortKey::parse("salary; DROP TABLE Employees"),
            direction: SortDirection::Asc,
        })
        .await?;
    let ids: Vec<i64> = page.items.iter().map(|e| e.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
    assert_eq!(ids.len(), 5);

    let past_end = repo
        .list(PageRequest {
            page: 9,
            page_size: 2,
            ..PageRequest::default()
        })
        .await?;
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total, 5);

    for page in [u64::MAX, u64::MAX / 10] {
        let far = repo
            .list(PageRequest {
                page,
                page_size: 100,
                ..PageRequest::default()
            })
            .await?;
        assert!(far.items.is_empty());
        assert_eq!(far.total, 5);
    }
    Ok(())
}
