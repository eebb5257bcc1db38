//! Request principal derived from a verified access token.

use serde::{Deserialize, Serialize};

use super::role::Role;

/// Identity extracted from a verified access token.
///
/// Never persisted beyond the token itself; it exists for the lifetime of a
/// single request. `domain_id` is `None` for domain-independent roles
/// (`user`, `super_admin`) and for scoped roles that have not been assigned a
/// domain yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Persisted user id.
    pub user_id: i32,
    /// Account email, also the refresh-token subject.
    pub email: String,
    /// Display username.
    pub username: String,
    /// Assigned role.
    pub role: Role,
    /// Assigned domain, when the role is domain-scoped.
    pub domain_id: Option<i32>,
}

impl Principal {
    /// Whether this principal is scoped to the given domain.
    pub fn is_assigned_to(&self, domain_id: i32) -> bool {
        self.domain_id == Some(domain_id)
    }
}
