//! Subscriber use-cases: the public signup and the admin-side roster.

use std::sync::Arc;

use super::error::DomainError;
use super::identity::Principal;
use super::policy::{self, Action, Target};
use super::ports::SubscriberRepository;
use super::subscribers::{Subscriber, SubscriberDraft};

/// Subscriber use-cases over the persistence port.
pub struct SubscriberService {
    subscribers: Arc<dyn SubscriberRepository>,
}

impl SubscriberService {
    /// Assemble the service over its port.
    pub fn new(subscribers: Arc<dyn SubscriberRepository>) -> Self {
        Self { subscribers }
    }

    /// The full subscriber roster. Super admin only.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<Subscriber>, DomainError> {
        policy::authorize(principal, Action::ListSubscribers, &Target::None)?;
        Ok(self.subscribers.list().await?)
    }

    /// Register a subscription. Open to anonymous callers; a duplicate email
    /// surfaces as a conflict.
    pub async fn subscribe(&self, draft: SubscriberDraft) -> Result<Subscriber, DomainError> {
        Ok(self.subscribers.insert(&draft).await?)
    }

    /// Remove a subscription. Super admin only.
    pub async fn delete(&self, principal: &Principal, id: i32) -> Result<(), DomainError> {
        policy::authorize(principal, Action::DeleteSubscriber, &Target::None)?;
        if !self.subscribers.delete(id).await? {
            return Err(DomainError::not_found("subscriber not found"));
        }
        Ok(())
    }
}
