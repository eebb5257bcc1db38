//! Newsletter subscriber entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A newsletter subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Persisted id.
    pub id: i32,
    /// Unique subscription email.
    pub email: String,
    /// Subscriber's display name.
    pub name: String,
    /// When the subscription was created.
    pub subscribed_at: DateTime<Utc>,
}

const NAME_MIN_LEN: usize = 2;
const NAME_MAX_LEN: usize = 100;

/// Validated fields for a new subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberDraft {
    email: String,
    name: String,
}

impl SubscriberDraft {
    /// Validate the draft fields.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Result<Self, DomainError> {
        let email = email.into();
        let name = name.into();
        if !email.contains('@') {
            return Err(DomainError::invalid_request("email must be a valid address"));
        }
        let trimmed = name.trim();
        if trimmed.len() < NAME_MIN_LEN || trimmed.len() > NAME_MAX_LEN {
            return Err(DomainError::invalid_request(format!(
                "name must be between {NAME_MIN_LEN} and {NAME_MAX_LEN} characters"
            )));
        }
        Ok(Self {
            email,
            name: trimmed.to_owned(),
        })
    }

    /// Subscription email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
