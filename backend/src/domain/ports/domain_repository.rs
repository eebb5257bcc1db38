//! Port interface for domain persistence.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::domains::{Domain, DomainDraft};
use crate::domain::error::DomainError;

/// Errors surfaced by the domain persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainRepositoryError {
    /// Connection pool checkout or connectivity failure.
    #[error("domain store connection failure: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query execution failed.
    #[error("domain store query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
    /// Domain name already taken.
    #[error("domain store uniqueness violation: {message}")]
    Duplicate {
        /// Adapter-level failure description.
        message: String,
    },
}

impl From<DomainRepositoryError> for DomainError {
    fn from(err: DomainRepositoryError) -> Self {
        match err {
            DomainRepositoryError::Connection { .. } => {
                Self::service_unavailable("domain store is unavailable")
            }
            DomainRepositoryError::Query { .. } => Self::internal("domain store query failed"),
            DomainRepositoryError::Duplicate { .. } => {
                Self::conflict("a domain with this name already exists")
            }
        }
    }
}

/// Domain persistence operations.
#[async_trait]
pub trait DomainRepository: Send + Sync {
    /// All domains, ordered by name.
    async fn list(&self) -> Result<Vec<Domain>, DomainRepositoryError>;

    /// Fetch one domain by id.
    async fn find(&self, id: i32) -> Result<Option<Domain>, DomainRepositoryError>;

    /// Insert a new domain.
    async fn insert(&self, draft: &DomainDraft) -> Result<Domain, DomainRepositoryError>;

    /// Update a domain's name and colour; `None` when the id does not exist.
    async fn update(
        &self,
        id: i32,
        draft: &DomainDraft,
    ) -> Result<Option<Domain>, DomainRepositoryError>;

    /// Delete a domain; its articles cascade at the schema level. Returns
    /// whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, DomainRepositoryError>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! In-memory domain repository shared across service tests.
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    pub struct InMemoryDomainRepository {
        rows: Mutex<Vec<Domain>>,
        next_id: Mutex<i32>,
    }

    impl InMemoryDomainRepository {
        pub fn with_domain(self, domain: Domain) -> Self {
            {
                let mut next = self.next_id.lock().expect("mutex poisoned");
                *next = (*next).max(domain.id);
                self.rows.lock().expect("mutex poisoned").push(domain);
            }
            self
        }
    }

    #[async_trait]
    impl DomainRepository for InMemoryDomainRepository {
        async fn list(&self) -> Result<Vec<Domain>, DomainRepositoryError> {
            let mut rows = self.rows.lock().expect("mutex poisoned").clone();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(rows)
        }

        async fn find(&self, id: i32) -> Result<Option<Domain>, DomainRepositoryError> {
            Ok(self
                .rows
                .lock()
                .expect("mutex poisoned")
                .iter()
                .find(|d| d.id == id)
                .cloned())
        }

        async fn insert(&self, draft: &DomainDraft) -> Result<Domain, DomainRepositoryError> {
            let mut rows = self.rows.lock().expect("mutex poisoned");
            if rows.iter().any(|d| d.name == draft.name()) {
                return Err(DomainRepositoryError::Duplicate {
                    message: "domains_name_key".to_owned(),
                });
            }
            let mut next = self.next_id.lock().expect("mutex poisoned");
            *next += 1;
            let domain = Domain {
                id: *next,
                name: draft.name().to_owned(),
                color: draft.color().to_owned(),
            };
            rows.push(domain.clone());
            Ok(domain)
        }

        async fn update(
            &self,
            id: i32,
            draft: &DomainDraft,
        ) -> Result<Option<Domain>, DomainRepositoryError> {
            let mut rows = self.rows.lock().expect("mutex poisoned");
            let Some(row) = rows.iter_mut().find(|d| d.id == id) else {
                return Ok(None);
            };
            row.name = draft.name().to_owned();
            row.color = draft.color().to_owned();
            Ok(Some(row.clone()))
        }

        async fn delete(&self, id: i32) -> Result<bool, DomainRepositoryError> {
            let mut rows = self.rows.lock().expect("mutex poisoned");
            let before = rows.len();
            rows.retain(|d| d.id != id);
            Ok(rows.len() < before)
        }
    }
}
