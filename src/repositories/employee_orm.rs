//! Employee repository backed by the SeaORM entity API.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait, QueryOrder, Set,
};
use std::sync::Arc;

use super::{EmployeeChanges, EmployeeRepository, NewEmployee, Page, PageRequest};
use crate::error::RepositoryError;
use crate::models::employee::{self, Entity as Employee};

/// Repository for employee database operations through SeaORM entities
#[derive(Debug, Clone)]
pub struct OrmEmployeeRepository {
    /// Database connection pool
    pub db: Arc<DatabaseConnection>,
}

impl OrmEmployeeRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmployeeRepository for OrmEmployeeRepository {
    async fn create(&self, new: NewEmployee) -> Result<employee::Model, RepositoryError> {
        // Id and both timestamps are left to the database.
        let model = employee::ActiveModel {
            id: NotSet,
            active: Set(Some(new.active.unwrap_or(true))),
            created_by: Set(new.created_by),
            name: Set(new.name),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            email: Set(new.email),
            ..Default::default()
        };

        Ok(model.insert(&*self.db).await?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<employee::Model>, RepositoryError> {
        Ok(Employee::find_by_id(id).one(&*self.db).await?)
    }

    async fn update(
        &self,
        id: i64,
        changes: EmployeeChanges,
    ) -> Result<employee::Model, RepositoryError> {
        let existing = Employee::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or(RepositoryError::NotFound { id })?;

        if changes.is_empty() {
            return Ok(existing);
        }

        let mut active_model: employee::ActiveModel = existing.into();
        if let Some(active) = changes.active {
            active_model.active = Set(Some(active));
        }
        if let Some(name) = changes.name {
            active_model.name = Set(Some(name));
        }
        if let Some(first_name) = changes.first_name {
            active_model.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = changes.last_name {
            active_model.last_name = Set(Some(last_name));
        }
        if let Some(email) = changes.email {
            active_model.email = Set(Some(email));
        }

        Ok(active_model.update(&*self.db).await?)
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = Employee::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound { id });
        }
        Ok(())
    }

    async fn list(&self, request: PageRequest) -> Result<Page<employee::Model>, RepositoryError> {
        let request = request.normalized();
        let order = request.direction.order();

        let paginator = Employee::find()
            .order_by(request.sort.column(), order.clone())
            .order_by(employee::Column::Id, order)
            .paginate(&*self.db, request.page_size);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(request.page - 1).await?;

        Ok(Page {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        })
    }
}
