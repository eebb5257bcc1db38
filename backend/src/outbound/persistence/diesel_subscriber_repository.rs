//! Diesel-backed subscriber repository.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{SubscriberRepository, SubscriberRepositoryError};
use crate::domain::subscribers::{Subscriber, SubscriberDraft};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewSubscriberRow, SubscriberRow};
use super::pool::{DbPool, PoolError};
use super::schema::subscribers;

/// Subscriber persistence over the shared connection pool.
#[derive(Clone)]
pub struct DieselSubscriberRepository {
    pool: DbPool,
}

impl DieselSubscriberRepository {
    /// Create the adapter over a pool handle.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(error: diesel::result::Error) -> SubscriberRepositoryError {
    map_diesel_error(
        error,
        |message| SubscriberRepositoryError::Query { message },
        |message| SubscriberRepositoryError::Connection { message },
        |message| SubscriberRepositoryError::Duplicate { message },
    )
}

fn pool_error(error: PoolError) -> SubscriberRepositoryError {
    map_pool_error(error, |message| SubscriberRepositoryError::Connection { message })
}

fn to_entity(row: SubscriberRow) -> Subscriber {
    Subscriber {
        id: row.id,
        email: row.email,
        name: row.name,
        subscribed_at: row.subscribed_at,
    }
}

#[async_trait]
impl SubscriberRepository for DieselSubscriberRepository {
    async fn list(&self) -> Result<Vec<Subscriber>, SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = subscribers::table
            .order(subscribers::id.asc())
            .select(SubscriberRow::as_select())
            .load::<SubscriberRow>(&mut conn)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(to_entity).collect())
    }

    async fn insert(
        &self,
        draft: &SubscriberDraft,
    ) -> Result<Subscriber, SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::insert_into(subscribers::table)
            .values(NewSubscriberRow {
                email: draft.email(),
                name: draft.name(),
            })
            .returning(SubscriberRow::as_returning())
            .get_result::<SubscriberRow>(&mut conn)
            .await
            .map_err(db_error)?;
        Ok(to_entity(row))
    }

    async fn delete(&self, id: i32) -> Result<bool, SubscriberRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed = diesel::delete(subscribers::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(db_error)?;
        Ok(removed > 0)
    }
}
