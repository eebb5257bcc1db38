//! User account entity and escalation-safe update shaping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::error::DomainError;
use super::identity::Principal;
use super::role::Role;

/// A user account, as exposed to administrators. Never carries the password
/// hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Persisted id.
    pub id: i32,
    /// Unique display name.
    pub username: String,
    /// Unique login email.
    pub email: String,
    /// Assigned role.
    pub role: Role,
    /// Assigned domain, for domain-scoped roles.
    pub domain_id: Option<i32>,
    /// Assigned domain's display name, resolved at read time.
    pub domain_name: Option<String>,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

/// Minimum accepted password length for new or changed passwords.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validated fields for creating a user account.
///
/// The plaintext password is wiped from memory when the draft is dropped.
#[derive(Debug)]
pub struct UserDraft {
    username: String,
    email: String,
    password: Zeroizing<String>,
    role: Role,
    domain_id: Option<i32>,
}

impl UserDraft {
    /// Validate the draft fields.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        role: Role,
        domain_id: Option<i32>,
    ) -> Result<Self, DomainError> {
        let username = username.into();
        let email = email.into();
        if username.trim().is_empty() {
            return Err(DomainError::invalid_request("username must not be empty"));
        }
        if !email.contains('@') {
            return Err(DomainError::invalid_request("email must be a valid address"));
        }
        let password = Zeroizing::new(password.into());
        if password.len() < MIN_PASSWORD_LEN {
            return Err(DomainError::invalid_request(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if role.is_domain_scoped() && domain_id.is_none() {
            return Err(DomainError::invalid_request(
                "domain-scoped roles require a domain assignment",
            ));
        }
        Ok(Self {
            username,
            email,
            password,
            role,
            domain_id,
        })
    }

    /// Display name.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Login email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Plaintext password, to be hashed exactly once.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Assigned role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Assigned domain.
    pub fn domain_id(&self) -> Option<i32> {
        self.domain_id
    }
}

/// Partial account update. Absent fields are left unchanged.
#[derive(Debug, Default)]
pub struct UserUpdate {
    /// Replacement username.
    pub username: Option<String>,
    /// Replacement email.
    pub email: Option<String>,
    /// Replacement plaintext password, wiped on drop.
    pub password: Option<Zeroizing<String>>,
    /// Replacement role.
    pub role: Option<Role>,
    /// Replacement domain assignment. The outer option distinguishes "leave
    /// unchanged" from "clear the assignment".
    pub domain_id: Option<Option<i32>>,
}

fn tier(role: Role) -> u8 {
    match role {
        Role::User => 0,
        Role::Contributor => 1,
        Role::DomainAdmin => 2,
        Role::SuperAdmin => 3,
    }
}

impl UserUpdate {
    /// Reject role and domain changes the caller is not entitled to make.
    ///
    /// A caller may never assign a role above their own tier, and only the
    /// admin tier may change roles or domain assignments at all. This closes
    /// the self-service escalation path where an account rewrites its own
    /// role through the generic update endpoint.
    pub fn clamp_privileges(mut self, principal: &Principal) -> Result<Self, DomainError> {
        if let Some(requested) = self.role {
            if !principal.role.is_admin_tier() {
                return Err(DomainError::forbidden("role changes require an admin role"));
            }
            if tier(requested) > tier(principal.role) {
                return Err(DomainError::forbidden(
                    "cannot assign a role above your own",
                ));
            }
        }
        if self.domain_id.is_some() && !principal.role.is_admin_tier() {
            // Silently dropped rather than rejected; non-admin self-updates
            // routinely echo the whole profile back.
            self.domain_id = None;
        }
        Ok(self)
    }

    /// Validate replacement field contents.
    pub fn validated(self) -> Result<Self, DomainError> {
        if self.username.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(DomainError::invalid_request("username must not be empty"));
        }
        if self.email.as_deref().is_some_and(|e| !e.contains('@')) {
            return Err(DomainError::invalid_request("email must be a valid address"));
        }
        if self
            .password
            .as_ref()
            .is_some_and(|p| p.len() < MIN_PASSWORD_LEN)
        {
            return Err(DomainError::invalid_request(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::identity::fixtures;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn draft_requires_domain_for_scoped_roles() {
        let err = UserDraft::new("w", "w@example.com", "longenough", Role::Contributor, None)
            .expect_err("contributor without domain rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case("", "a@b.c", "longenough")]
    #[case("name", "not-an-email", "longenough")]
    #[case("name", "a@b.c", "short")]
    fn draft_rejects_invalid_fields(
        #[case] username: &str,
        #[case] email: &str,
        #[case] password: &str,
    ) {
        let err = UserDraft::new(username, email, password, Role::User, None)
            .expect_err("invalid draft rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    // A reader cannot touch their own role at all.
    #[case(fixtures::reader(), Role::SuperAdmin, false)]
    #[case(fixtures::reader(), Role::Contributor, false)]
    // Domain admins assign up to their own tier.
    #[case(fixtures::domain_admin(16), Role::Contributor, true)]
    #[case(fixtures::domain_admin(16), Role::DomainAdmin, true)]
    #[case(fixtures::domain_admin(16), Role::SuperAdmin, false)]
    #[case(fixtures::super_admin(), Role::SuperAdmin, true)]
    fn role_changes_are_clamped_to_the_caller_tier(
        #[case] principal: Principal,
        #[case] requested: Role,
        #[case] allowed: bool,
    ) {
        let update = UserUpdate {
            role: Some(requested),
            ..UserUpdate::default()
        };
        let result = update.clamp_privileges(&principal);
        assert_eq!(result.is_ok(), allowed);
        if !allowed {
            assert_eq!(
                result.expect_err("clamped").code(),
                ErrorCode::Forbidden
            );
        }
    }

    #[rstest]
    fn non_admin_domain_changes_are_dropped_silently() {
        let update = UserUpdate {
            username: Some("newname".to_owned()),
            domain_id: Some(Some(16)),
            ..UserUpdate::default()
        };
        let clamped = update
            .clamp_privileges(&fixtures::reader())
            .expect("username-only update passes");
        assert_eq!(clamped.domain_id, None);
        assert_eq!(clamped.username.as_deref(), Some("newname"));
    }
}
