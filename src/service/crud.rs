//! Generic CRUD execution through the data gateway, one repository per resource.

use crate::config::ResolvedResource;
use crate::error::RepositoryError;
use crate::service::Entity;
use crate::sql::{self, PgBindValue};
use crate::store::Gateway;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct ResourceRepository {
    gateway: Arc<dyn Gateway>,
    resource: Arc<ResolvedResource>,
}

impl ResourceRepository {
    pub fn new(gateway: Arc<dyn Gateway>, resource: Arc<ResolvedResource>) -> Self {
        Self { gateway, resource }
    }

    pub fn resource(&self) -> &ResolvedResource {
        &self.resource
    }

    /// All rows visible to readers. An empty table is an empty vec, not an error.
    pub async fn list_active(&self) -> Result<Vec<Value>, RepositoryError> {
        let q = sql::select_list(&self.resource);
        Ok(self.gateway.fetch_all(&q).await?)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Value, RepositoryError> {
        let q = sql::select_by_id(&self.resource, id);
        self.gateway
            .fetch_all(&q)
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound { id })
    }

    /// First active row with `column = value`, if any.
    pub async fn find_by(&self, column: &str, value: PgBindValue) -> Result<Option<Value>, RepositoryError> {
        let q = sql::select_by_column(&self.resource, column, value);
        Ok(self.gateway.fetch_all(&q).await?.into_iter().next())
    }

    /// Insert and return the stored row, generated id included.
    pub async fn insert(&self, entity: &Entity) -> Result<Value, RepositoryError> {
        let q = sql::insert(&self.resource, entity);
        self.gateway
            .fetch_all(&q)
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::Infrastructure(sqlx::Error::RowNotFound))
    }

    /// Full-replace update. Zero affected rows is the only not-found signal.
    pub async fn replace_by_id(&self, id: i64, entity: &Entity) -> Result<Value, RepositoryError> {
        let q = sql::update(&self.resource, id, entity);
        let affected = self.gateway.execute(&q).await?;
        if affected == 0 {
            return Err(RepositoryError::NotFound { id });
        }
        Ok(entity.to_json_with_id(&self.resource.pk_column, id))
    }

    /// Soft or hard delete per the resource's policy. A soft delete of an already
    /// flagged row still matches it, so repeating it succeeds.
    pub async fn delete_by_id(&self, id: i64) -> Result<(), RepositoryError> {
        let q = sql::delete_by_id(&self.resource, id);
        let affected = self.gateway.execute(&q).await?;
        if affected == 0 {
            return Err(RepositoryError::NotFound { id });
        }
        Ok(())
    }

    /// Unconditional bulk hard delete. Returns the number of rows removed.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let q = sql::delete_all(&self.resource);
        Ok(self.gateway.execute(&q).await?)
    }
}
