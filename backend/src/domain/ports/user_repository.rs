//! Port interface for user account persistence.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::policy::DomainScope;
use crate::domain::role::Role;
use crate::domain::user_account::UserAccount;

/// Errors surfaced by the user persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserRepositoryError {
    /// Connection pool checkout or connectivity failure.
    #[error("user store connection failure: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query execution failed.
    #[error("user store query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
    /// Username or email already taken.
    #[error("user store uniqueness violation: {message}")]
    Duplicate {
        /// Adapter-level failure description.
        message: String,
    },
}

impl From<UserRepositoryError> for DomainError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::Connection { .. } => {
                Self::service_unavailable("user store is unavailable")
            }
            UserRepositoryError::Query { .. } => Self::internal("user store query failed"),
            UserRepositoryError::Duplicate { .. } => {
                Self::conflict("username or email is already taken")
            }
        }
    }
}

/// An account paired with its password hash, for credential verification
/// only. Never leaves the auth path.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    /// The account.
    pub account: UserAccount,
    /// Stored bcrypt hash.
    pub password_hash: String,
}

/// Fields persisted when creating an account.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    /// Unique display name.
    pub username: String,
    /// Unique login email.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: Role,
    /// Assigned domain, for domain-scoped roles.
    pub domain_id: Option<i32>,
}

/// Column-level account changes. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserRecordChanges {
    /// Replacement username.
    pub username: Option<String>,
    /// Replacement email.
    pub email: Option<String>,
    /// Replacement password hash.
    pub password_hash: Option<String>,
    /// Replacement role.
    pub role: Option<Role>,
    /// Replacement domain assignment; the outer option distinguishes "leave
    /// unchanged" from "clear".
    pub domain_id: Option<Option<i32>>,
}

/// User account persistence operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch one account by id.
    async fn find(&self, id: i32) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Fetch an account with its password hash by login email.
    async fn find_credentials(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, UserRepositoryError>;

    /// Accounts within the scope, with resolved domain names.
    async fn list(&self, scope: DomainScope) -> Result<Vec<UserAccount>, UserRepositoryError>;

    /// Insert a new account.
    async fn insert(&self, record: &NewUserRecord) -> Result<UserAccount, UserRepositoryError>;

    /// Apply column changes and return the updated account, or `None` when
    /// the account does not exist.
    async fn update(
        &self,
        id: i32,
        changes: &UserRecordChanges,
    ) -> Result<Option<UserAccount>, UserRepositoryError>;

    /// Delete an account. Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, UserRepositoryError>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! In-memory user repository shared across service tests.
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    pub struct InMemoryUserRepository {
        rows: Mutex<Vec<CredentialRecord>>,
        next_id: Mutex<i32>,
    }

    impl InMemoryUserRepository {
        pub fn with_user(self, account: UserAccount, password_hash: &str) -> Self {
            {
                let mut next = self.next_id.lock().expect("mutex poisoned");
                *next = (*next).max(account.id);
                self.rows.lock().expect("mutex poisoned").push(CredentialRecord {
                    account,
                    password_hash: password_hash.to_owned(),
                });
            }
            self
        }

        pub fn account(id: i32, role: Role, domain_id: Option<i32>) -> UserAccount {
            UserAccount {
                id,
                username: format!("user{id}"),
                email: format!("user{id}@example.com"),
                role,
                domain_id,
                domain_name: domain_id.map(|d| format!("domain-{d}")),
                created_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find(&self, id: i32) -> Result<Option<UserAccount>, UserRepositoryError> {
            Ok(self
                .rows
                .lock()
                .expect("mutex poisoned")
                .iter()
                .find(|r| r.account.id == id)
                .map(|r| r.account.clone()))
        }

        async fn find_credentials(
            &self,
            email: &str,
        ) -> Result<Option<CredentialRecord>, UserRepositoryError> {
            Ok(self
                .rows
                .lock()
                .expect("mutex poisoned")
                .iter()
                .find(|r| r.account.email == email)
                .cloned())
        }

        async fn list(
            &self,
            scope: crate::domain::policy::DomainScope,
        ) -> Result<Vec<UserAccount>, UserRepositoryError> {
            use crate::domain::policy::DomainScope;
            let rows = self.rows.lock().expect("mutex poisoned");
            Ok(rows
                .iter()
                .map(|r| r.account.clone())
                .filter(|a| match scope {
                    DomainScope::All => true,
                    DomainScope::Domain(d) => a.domain_id == Some(d),
                    DomainScope::Nothing => false,
                })
                .collect())
        }

        async fn insert(
            &self,
            record: &NewUserRecord,
        ) -> Result<UserAccount, UserRepositoryError> {
            let mut rows = self.rows.lock().expect("mutex poisoned");
            if rows
                .iter()
                .any(|r| r.account.email == record.email || r.account.username == record.username)
            {
                return Err(UserRepositoryError::Duplicate {
                    message: "users_email_key".to_owned(),
                });
            }
            let mut next = self.next_id.lock().expect("mutex poisoned");
            *next += 1;
            let account = UserAccount {
                id: *next,
                username: record.username.clone(),
                email: record.email.clone(),
                role: record.role,
                domain_id: record.domain_id,
                domain_name: record.domain_id.map(|d| format!("domain-{d}")),
                created_at: Utc::now(),
            };
            rows.push(CredentialRecord {
                account: account.clone(),
                password_hash: record.password_hash.clone(),
            });
            Ok(account)
        }

        async fn update(
            &self,
            id: i32,
            changes: &UserRecordChanges,
        ) -> Result<Option<UserAccount>, UserRepositoryError> {
            let mut rows = self.rows.lock().expect("mutex poisoned");
            let Some(row) = rows.iter_mut().find(|r| r.account.id == id) else {
                return Ok(None);
            };
            if let Some(username) = &changes.username {
                row.account.username = username.clone();
            }
            if let Some(email) = &changes.email {
                row.account.email = email.clone();
            }
            if let Some(hash) = &changes.password_hash {
                row.password_hash = hash.clone();
            }
            if let Some(role) = changes.role {
                row.account.role = role;
            }
            if let Some(domain_id) = changes.domain_id {
                row.account.domain_id = domain_id;
                row.account.domain_name = domain_id.map(|d| format!("domain-{d}"));
            }
            Ok(Some(row.account.clone()))
        }

        async fn delete(&self, id: i32) -> Result<bool, UserRepositoryError> {
            let mut rows = self.rows.lock().expect("mutex poisoned");
            let before = rows.len();
            rows.retain(|r| r.account.id != id);
            Ok(rows.len() < before)
        }
    }
}
