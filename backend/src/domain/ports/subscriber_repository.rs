//! Port interface for subscriber persistence.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::DomainError;
use crate::domain::subscribers::{Subscriber, SubscriberDraft};

/// Errors surfaced by the subscriber persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriberRepositoryError {
    /// Connection pool checkout or connectivity failure.
    #[error("subscriber store connection failure: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query execution failed.
    #[error("subscriber store query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
    /// Email already subscribed.
    #[error("subscriber store uniqueness violation: {message}")]
    Duplicate {
        /// Adapter-level failure description.
        message: String,
    },
}

impl From<SubscriberRepositoryError> for DomainError {
    fn from(err: SubscriberRepositoryError) -> Self {
        match err {
            SubscriberRepositoryError::Connection { .. } => {
                Self::service_unavailable("subscriber store is unavailable")
            }
            SubscriberRepositoryError::Query { .. } => {
                Self::internal("subscriber store query failed")
            }
            SubscriberRepositoryError::Duplicate { .. } => {
                Self::conflict("this email is already subscribed")
            }
        }
    }
}

/// Subscriber persistence operations.
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// All subscribers, ordered by id.
    async fn list(&self) -> Result<Vec<Subscriber>, SubscriberRepositoryError>;

    /// Insert a new subscription.
    async fn insert(
        &self,
        draft: &SubscriberDraft,
    ) -> Result<Subscriber, SubscriberRepositoryError>;

    /// Remove a subscription. Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, SubscriberRepositoryError>;
}
