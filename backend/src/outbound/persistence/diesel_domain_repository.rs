//! Diesel-backed domain repository.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::domains::{Domain, DomainDraft};
use crate::domain::ports::{DomainRepository, DomainRepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{DomainRow, DomainRowValues};
use super::pool::{DbPool, PoolError};
use super::schema::domains;

/// Domain persistence over the shared connection pool.
#[derive(Clone)]
pub struct DieselDomainRepository {
    pool: DbPool,
}

impl DieselDomainRepository {
    /// Create the adapter over a pool handle.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(error: diesel::result::Error) -> DomainRepositoryError {
    map_diesel_error(
        error,
        |message| DomainRepositoryError::Query { message },
        |message| DomainRepositoryError::Connection { message },
        |message| DomainRepositoryError::Duplicate { message },
    )
}

fn pool_error(error: PoolError) -> DomainRepositoryError {
    map_pool_error(error, |message| DomainRepositoryError::Connection { message })
}

fn to_entity(row: DomainRow) -> Domain {
    Domain {
        id: row.id,
        name: row.name,
        color: row.color,
    }
}

#[async_trait]
impl DomainRepository for DieselDomainRepository {
    async fn list(&self) -> Result<Vec<Domain>, DomainRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = domains::table
            .order(domains::name.asc())
            .select(DomainRow::as_select())
            .load::<DomainRow>(&mut conn)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(to_entity).collect())
    }

    async fn find(&self, id: i32) -> Result<Option<Domain>, DomainRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = domains::table
            .find(id)
            .select(DomainRow::as_select())
            .first::<DomainRow>(&mut conn)
            .await
            .optional()
            .map_err(db_error)?;
        Ok(row.map(to_entity))
    }

    async fn insert(&self, draft: &DomainDraft) -> Result<Domain, DomainRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::insert_into(domains::table)
            .values(DomainRowValues {
                name: draft.name(),
                color: draft.color(),
            })
            .returning(DomainRow::as_returning())
            .get_result::<DomainRow>(&mut conn)
            .await
            .map_err(db_error)?;
        Ok(to_entity(row))
    }

    async fn update(
        &self,
        id: i32,
        draft: &DomainDraft,
    ) -> Result<Option<Domain>, DomainRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::update(domains::table.find(id))
            .set(DomainRowValues {
                name: draft.name(),
                color: draft.color(),
            })
            .returning(DomainRow::as_returning())
            .get_result::<DomainRow>(&mut conn)
            .await
            .optional()
            .map_err(db_error)?;
        Ok(row.map(to_entity))
    }

    async fn delete(&self, id: i32) -> Result<bool, DomainRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed = diesel::delete(domains::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(db_error)?;
        Ok(removed > 0)
    }
}
