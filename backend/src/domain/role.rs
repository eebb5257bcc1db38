//! User roles and the coarse role hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role assigned to every user account.
///
/// `DomainAdmin` and `Contributor` are domain-scoped: whatever the hierarchy
/// grants them is further restricted to resources in their own domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Plain reader; no content privileges.
    User,
    /// May author articles in their assigned domain.
    Contributor,
    /// Administers one domain: validates, archives, and manages its content.
    DomainAdmin,
    /// Platform-wide administrator.
    SuperAdmin,
}

impl Role {
    /// Whether the role belongs to the admin tier (`domain_admin` or
    /// `super_admin`).
    pub fn is_admin_tier(self) -> bool {
        matches!(self, Self::DomainAdmin | Self::SuperAdmin)
    }

    /// Whether the role's privileges are confined to a single domain.
    pub fn is_domain_scoped(self) -> bool {
        matches!(self, Self::Contributor | Self::DomainAdmin)
    }

    /// Stable wire representation, matching the persisted role column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Contributor => "contributor",
            Self::DomainAdmin => "domain_admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "contributor" => Ok(Self::Contributor),
            "domain_admin" => Ok(Self::DomainAdmin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}
