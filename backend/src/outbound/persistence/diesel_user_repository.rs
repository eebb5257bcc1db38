//! Diesel-backed user account repository.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::policy::DomainScope;
use crate::domain::ports::{
    CredentialRecord, NewUserRecord, UserRecordChanges, UserRepository, UserRepositoryError,
};
use crate::domain::role::Role;
use crate::domain::user_account::UserAccount;

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow, UserRowChanges};
use super::pool::{DbPool, PoolError};
use super::schema::{domains, users};

/// User account persistence over the shared connection pool.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create the adapter over a pool handle.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        |message| UserRepositoryError::Query { message },
        |message| UserRepositoryError::Connection { message },
        |message| UserRepositoryError::Duplicate { message },
    )
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, |message| UserRepositoryError::Connection { message })
}

/// A persisted role column that fails to parse is data corruption, not a
/// caller mistake.
fn parse_role(raw: &str) -> Result<Role, UserRepositoryError> {
    raw.parse().map_err(|_| UserRepositoryError::Query {
        message: format!("corrupt role column: {raw}"),
    })
}

fn to_entity(row: UserRow, domain_name: Option<String>) -> Result<UserAccount, UserRepositoryError> {
    Ok(UserAccount {
        id: row.id,
        username: row.username,
        email: row.email,
        role: parse_role(&row.role)?,
        domain_id: row.domain_id,
        domain_name,
        created_at: row.created_at,
    })
}

async fn domain_name(
    conn: &mut AsyncPgConnection,
    domain_id: Option<i32>,
) -> Result<Option<String>, diesel::result::Error> {
    match domain_id {
        None => Ok(None),
        Some(domain_id) => domains::table
            .find(domain_id)
            .select(domains::name)
            .first::<String>(conn)
            .await
            .optional(),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find(&self, id: i32) -> Result<Option<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .find(id)
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(db_error)?;
        match row {
            None => Ok(None),
            Some(row) => {
                let name = domain_name(&mut conn, row.domain_id).await.map_err(db_error)?;
                Ok(Some(to_entity(row, name)?))
            }
        }
    }

    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(db_error)?;
        match row {
            None => Ok(None),
            Some(row) => {
                let name = domain_name(&mut conn, row.domain_id).await.map_err(db_error)?;
                let password_hash = row.password_hash.clone();
                Ok(Some(CredentialRecord {
                    account: to_entity(row, name)?,
                    password_hash,
                }))
            }
        }
    }

    async fn list(&self, scope: DomainScope) -> Result<Vec<UserAccount>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = users::table.order(users::username.asc()).into_boxed();
        match scope {
            DomainScope::All => {}
            DomainScope::Domain(domain_id) => {
                query = query.filter(users::domain_id.eq(domain_id));
            }
            DomainScope::Nothing => return Ok(Vec::new()),
        }
        let rows = query
            .select(UserRow::as_select())
            .load::<UserRow>(&mut conn)
            .await
            .map_err(db_error)?;

        let domain_ids: Vec<i32> = rows.iter().filter_map(|r| r.domain_id).collect();
        let names: HashMap<i32, String> = domains::table
            .filter(domains::id.eq_any(&domain_ids))
            .select((domains::id, domains::name))
            .load::<(i32, String)>(&mut conn)
            .await
            .map_err(db_error)?
            .into_iter()
            .collect();

        rows.into_iter()
            .map(|row| {
                let name = row.domain_id.and_then(|d| names.get(&d).cloned());
                to_entity(row, name)
            })
            .collect()
    }

    async fn insert(&self, record: &NewUserRecord) -> Result<UserAccount, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = diesel::insert_into(users::table)
            .values(NewUserRow {
                username: &record.username,
                email: &record.email,
                password_hash: &record.password_hash,
                role: record.role.as_str(),
                domain_id: record.domain_id,
            })
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .map_err(db_error)?;
        let name = domain_name(&mut conn, row.domain_id).await.map_err(db_error)?;
        to_entity(row, name)
    }

    async fn update(
        &self,
        id: i32,
        changes: &UserRecordChanges,
    ) -> Result<Option<UserAccount>, UserRepositoryError> {
        // Diesel rejects an empty changeset at runtime.
        if changes.username.is_none()
            && changes.email.is_none()
            && changes.password_hash.is_none()
            && changes.role.is_none()
            && changes.domain_id.is_none()
        {
            return self.find(id).await;
        }
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row_changes = UserRowChanges {
            username: changes.username.as_deref(),
            email: changes.email.as_deref(),
            password_hash: changes.password_hash.as_deref(),
            role: changes.role.map(Role::as_str),
            domain_id: changes.domain_id,
        };
        let row = diesel::update(users::table.find(id))
            .set(row_changes)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(db_error)?;
        match row {
            None => Ok(None),
            Some(row) => {
                let name = domain_name(&mut conn, row.domain_id).await.map_err(db_error)?;
                Ok(Some(to_entity(row, name)?))
            }
        }
    }

    async fn delete(&self, id: i32) -> Result<bool, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed = diesel::delete(users::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(db_error)?;
        Ok(removed > 0)
    }
}
