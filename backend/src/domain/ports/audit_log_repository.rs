//! Port interface for the append-only audit trail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::audit::{AuditAction, AuditLogEntry, ClientMeta};
use crate::domain::error::DomainError;

/// Errors surfaced by the audit trail adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditLogRepositoryError {
    /// Connection pool checkout or connectivity failure.
    #[error("audit store connection failure: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query execution failed.
    #[error("audit store query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
}

impl From<AuditLogRepositoryError> for DomainError {
    fn from(err: AuditLogRepositoryError) -> Self {
        match err {
            AuditLogRepositoryError::Connection { .. } => {
                Self::service_unavailable("audit store is unavailable")
            }
            AuditLogRepositoryError::Query { .. } => Self::internal("audit store query failed"),
        }
    }
}

/// Audit trail operations. Entries are append-only; there is no update or
/// delete.
#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append a session event.
    async fn record(
        &self,
        user_id: i32,
        action: AuditAction,
        meta: &ClientMeta,
        at: DateTime<Utc>,
    ) -> Result<(), AuditLogRepositoryError>;

    /// Most recent entries, newest first, with resolved usernames.
    async fn list_recent(
        &self,
        limit: i64,
    ) -> Result<Vec<AuditLogEntry>, AuditLogRepositoryError>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Recording audit trail stub shared across service tests.
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Records appended entries in memory; optionally fails every write.
    #[derive(Default)]
    pub struct RecordingAuditLog {
        entries: Mutex<Vec<AuditLogEntry>>,
        fail_writes: bool,
    }

    impl RecordingAuditLog {
        pub fn failing() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
                fail_writes: true,
            }
        }

        pub fn recorded(&self) -> Vec<AuditLogEntry> {
            self.entries.lock().expect("mutex poisoned").clone()
        }
    }

    #[async_trait]
    impl AuditLogRepository for RecordingAuditLog {
        async fn record(
            &self,
            user_id: i32,
            action: AuditAction,
            meta: &ClientMeta,
            at: DateTime<Utc>,
        ) -> Result<(), AuditLogRepositoryError> {
            if self.fail_writes {
                return Err(AuditLogRepositoryError::Query {
                    message: "insert failed".to_owned(),
                });
            }
            let mut entries = self.entries.lock().expect("mutex poisoned");
            let id = i32::try_from(entries.len()).unwrap_or(i32::MAX) + 1;
            entries.push(AuditLogEntry {
                id,
                user_id,
                username: None,
                action,
                timestamp: at,
                ip_address: meta.ip_address.clone(),
                user_agent: meta.user_agent.clone(),
            });
            Ok(())
        }

        async fn list_recent(
            &self,
            limit: i64,
        ) -> Result<Vec<AuditLogEntry>, AuditLogRepositoryError> {
            let mut entries = self.entries.lock().expect("mutex poisoned").clone();
            entries.reverse();
            entries.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
            Ok(entries)
        }
    }
}
