//! Diesel-backed audit trail repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::audit::{AuditAction, AuditLogEntry, ClientMeta};
use crate::domain::ports::{AuditLogRepository, AuditLogRepositoryError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AuditRow, NewAuditRow};
use super::pool::{DbPool, PoolError};
use super::schema::{audit_log, users};

/// Append-only audit trail over the shared connection pool.
#[derive(Clone)]
pub struct DieselAuditLogRepository {
    pool: DbPool,
}

impl DieselAuditLogRepository {
    /// Create the adapter over a pool handle.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn db_error(error: diesel::result::Error) -> AuditLogRepositoryError {
    map_diesel_error(
        error,
        |message| AuditLogRepositoryError::Query { message },
        |message| AuditLogRepositoryError::Connection { message },
        // The trail has no uniqueness constraints; treat one as a plain
        // query failure if it ever appears.
        |message| AuditLogRepositoryError::Query { message },
    )
}

fn pool_error(error: PoolError) -> AuditLogRepositoryError {
    map_pool_error(error, |message| AuditLogRepositoryError::Connection { message })
}

fn to_entry(row: AuditRow, username: Option<String>) -> AuditLogEntry {
    let action = match row.action.as_str() {
        "logout" => AuditAction::Logout,
        _ => AuditAction::Login,
    };
    AuditLogEntry {
        id: row.id,
        user_id: row.user_id,
        username,
        action,
        timestamp: row.timestamp,
        ip_address: row.ip_address,
        user_agent: row.user_agent,
    }
}

#[async_trait]
impl AuditLogRepository for DieselAuditLogRepository {
    async fn record(
        &self,
        user_id: i32,
        action: AuditAction,
        meta: &ClientMeta,
        at: DateTime<Utc>,
    ) -> Result<(), AuditLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::insert_into(audit_log::table)
            .values(NewAuditRow {
                user_id,
                action: action.as_str(),
                timestamp: at,
                ip_address: meta.ip_address.as_deref(),
                user_agent: meta.user_agent.as_deref(),
            })
            .execute(&mut conn)
            .await
            .map_err(db_error)?;
        Ok(())
    }

    async fn list_recent(
        &self,
        limit: i64,
    ) -> Result<Vec<AuditLogEntry>, AuditLogRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = audit_log::table
            .order(audit_log::timestamp.desc())
            .limit(limit)
            .select(AuditRow::as_select())
            .load::<AuditRow>(&mut conn)
            .await
            .map_err(db_error)?;

        let user_ids: Vec<i32> = rows.iter().map(|r| r.user_id).collect();
        let usernames: HashMap<i32, String> = users::table
            .filter(users::id.eq_any(&user_ids))
            .select((users::id, users::username))
            .load::<(i32, String)>(&mut conn)
            .await
            .map_err(db_error)?
            .into_iter()
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let username = usernames.get(&row.user_id).cloned();
                to_entry(row, username)
            })
            .collect())
    }
}
