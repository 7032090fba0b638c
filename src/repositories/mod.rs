//! # Repository Layer
//!
//! The employee repository contract and its two data-access strategies:
//! [`OrmEmployeeRepository`] goes through the SeaORM entity API and
//! [`SqlEmployeeRepository`] runs hand-written SQL over the raw connection.
//! Both are interchangeable behind [`EmployeeRepository`].

use async_trait::async_trait;
use sea_orm::Order;

use crate::error::RepositoryError;
use crate::models::employee::{self, Model as EmployeeModel};
use crate::schema;

pub mod employee_orm;
pub mod employee_sql;

pub use employee_orm::OrmEmployeeRepository;
pub use employee_sql::SqlEmployeeRepository;

/// Largest page a listing returns.
pub const MAX_PAGE_SIZE: u64 = 100;
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Largest row offset a listing computes; both backends take a signed 64-bit offset.
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Fields of a new employee. `active` defaults to `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewEmployee {
    pub active: Option<bool>,
    pub created_by: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Partial update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeChanges {
    pub active: Option<bool>,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        self.active.is_none()
            && self.name.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
    }
}

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Id,
    Name,
    FirstName,
    LastName,
    Email,
    CreatedAt,
    Active,
}

impl SortKey {
    /// Parses a caller-supplied sort key. Anything outside the whitelist
    /// falls back to [`SortKey::Id`], so user input never reaches SQL.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('_', "").as_str() {
            "name" => SortKey::Name,
            "firstname" => SortKey::FirstName,
            "lastname" => SortKey::LastName,
            "email" => SortKey::Email,
            "createdat" => SortKey::CreatedAt,
            "active" => SortKey::Active,
            _ => SortKey::Id,
        }
    }

    pub fn column(self) -> employee::Column {
        match self {
            SortKey::Id => employee::Column::Id,
            SortKey::Name => employee::Column::Name,
            SortKey::FirstName => employee::Column::FirstName,
            SortKey::LastName => employee::Column::LastName,
            SortKey::Email => employee::Column::Email,
            SortKey::CreatedAt => employee::Column::CreatedAt,
            SortKey::Active => employee::Column::Active,
        }
    }

    pub fn column_name(self) -> &'static str {
        match self {
            SortKey::Id => schema::ID,
            SortKey::Name => schema::NAME,
            SortKey::FirstName => schema::FIRST_NAME,
            SortKey::LastName => schema::LAST_NAME,
            SortKey::Email => schema::EMAIL,
            SortKey::CreatedAt => schema::CREATED_AT,
            SortKey::Active => schema::ACTIVE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn order(self) -> Order {
        match self {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Page selection. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
    pub sort: SortKey,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortKey::default(),
            direction: SortDirection::default(),
        }
    }
}

impl PageRequest {
    /// Page 0 becomes 1 and the size is clamped to `1..=MAX_PAGE_SIZE`.
    ///
    /// The page is capped so the row offset stays within a signed 64-bit
    /// value; pages past the end simply come back empty.
    pub fn normalized(self) -> Self {
        let page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        let last_page = MAX_OFFSET / page_size + 1;
        Self {
            page: self.page.clamp(1, last_page),
            page_size,
            ..self
        }
    }

    /// Rows skipped before this page. Saturates instead of overflowing.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// Data access for employee records.
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    async fn create(&self, employee: NewEmployee) -> Result<EmployeeModel, RepositoryError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<EmployeeModel>, RepositoryError>;

    /// Applies `changes`; `NotFound` when no employee has `id`.
    async fn update(
        &self,
        id: i64,
        changes: EmployeeChanges,
    ) -> Result<EmployeeModel, RepositoryError>;

    /// `NotFound` when no row was deleted.
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;

    async fn list(&self, request: PageRequest) -> Result<Page<EmployeeModel>, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_whitelist_falls_back_to_id() {
        assert_eq!(SortKey::parse("last_name"), SortKey::LastName);
        assert_eq!(SortKey::parse("LastName"), SortKey::LastName);
        assert_eq!(SortKey::parse("EMAIL"), SortKey::Email);
        assert_eq!(SortKey::parse("created_at"), SortKey::CreatedAt);
        assert_eq!(SortKey::parse("Name; DROP TABLE Employees"), SortKey::Id);
        assert_eq!(SortKey::parse(""), SortKey::Id);
    }

    #[test]
    fn page_request_is_clamped() {
        let request = PageRequest {
            page: 0,
            page_size: 10_000,
            ..PageRequest::default()
        }
        .normalized();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, MAX_PAGE_SIZE);
        assert_eq!(request.offset(), 0);

        let request = PageRequest {
            page: 3,
            page_size: 0,
            ..PageRequest::default()
        }
        .normalized();
        assert_eq!(request.page_size, 1);
        assert_eq!(request.offset(), 2);
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let request = PageRequest {
            page: u64::MAX,
            page_size: 100,
            ..PageRequest::default()
        }
        .normalized();
        assert!(request.offset() <= i64::MAX as u64);
        assert_eq!(request.page, i64::MAX as u64 / 100 + 1);

        let request = PageRequest {
            page: u64::MAX / 10,
            page_size: 7,
            ..PageRequest::default()
        }
        .normalized();
        assert!(request.offset() <= i64::MAX as u64);
        assert_eq!(request.page_size, 7);

        let raw = PageRequest {
            page: u64::MAX,
            page_size: u64::MAX,
            ..PageRequest::default()
        };
        assert_eq!(raw.offset(), u64::MAX);
    }

    #[test]
    fn direction_parses_desc_only() {
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("sideways"), SortDirection::Asc);
    }
}
