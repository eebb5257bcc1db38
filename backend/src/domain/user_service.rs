//! User account use-cases: listings, provisioning, escalation-safe updates.

use std::sync::Arc;

use zeroize::Zeroizing;

use super::error::DomainError;
use super::identity::Principal;
use super::policy::{self, Action, DomainScope, Target, UserRef};
use super::ports::cache_key::{self, USERS_TTL_SECS};
use super::ports::{NewUserRecord, UserRecordChanges, UserRepository};
use super::read_model::CachedReads;
use super::user_account::{UserAccount, UserDraft, UserUpdate};

/// User account use-cases over the persistence and cache ports.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    reads: CachedReads,
    bcrypt_cost: u32,
}

impl UserService {
    /// Assemble the service over its ports.
    pub fn new(users: Arc<dyn UserRepository>, reads: CachedReads, bcrypt_cost: u32) -> Self {
        Self {
            users,
            reads,
            bcrypt_cost,
        }
    }

    /// Accounts visible to the caller, served through the cache.
    pub async fn list(&self, principal: &Principal) -> Result<Vec<UserAccount>, DomainError> {
        policy::authorize(principal, Action::ListUsers, &Target::None)?;
        let scope = policy::listing_scope(principal);
        let domain_filter = match scope {
            DomainScope::All => None,
            DomainScope::Domain(domain_id) => Some(domain_id),
            DomainScope::Nothing => return Ok(Vec::new()),
        };
        let key = cache_key::users(domain_filter);
        self.reads
            .get_or_load(&key, USERS_TTL_SECS, || async {
                Ok(self.users.list(scope).await?)
            })
            .await
    }

    /// Fetch one account the caller may see.
    pub async fn get(&self, principal: &Principal, id: i32) -> Result<UserAccount, DomainError> {
        let account = self.load(id).await?;
        policy::authorize(
            principal,
            Action::UpdateUser,
            &Target::User(UserRef {
                id: account.id,
                domain_id: account.domain_id,
            }),
        )?;
        Ok(account)
    }

    /// Provision a new account. Super admin only.
    pub async fn create(
        &self,
        principal: &Principal,
        draft: UserDraft,
    ) -> Result<UserAccount, DomainError> {
        policy::authorize(principal, Action::CreateUser, &Target::None)?;
        let password_hash = self.hash_password(draft.password()).await?;
        let record = NewUserRecord {
            username: draft.username().to_owned(),
            email: draft.email().to_owned(),
            password_hash,
            role: draft.role(),
            domain_id: draft.domain_id(),
        };
        let account = self.users.insert(&record).await?;
        self.invalidate_listings(&[account.domain_id]).await;
        Ok(account)
    }

    /// Apply an account update after clamping privilege changes to the
    /// caller's tier.
    pub async fn update(
        &self,
        principal: &Principal,
        id: i32,
        update: UserUpdate,
    ) -> Result<UserAccount, DomainError> {
        let existing = self.load(id).await?;
        policy::authorize(
            principal,
            Action::UpdateUser,
            &Target::User(UserRef {
                id: existing.id,
                domain_id: existing.domain_id,
            }),
        )?;
        let update = update.clamp_privileges(principal)?.validated()?;

        let password_hash = match &update.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };
        let changes = UserRecordChanges {
            username: update.username,
            email: update.email,
            password_hash,
            role: update.role,
            domain_id: update.domain_id,
        };
        let updated = self
            .users
            .update(id, &changes)
            .await?
            .ok_or_else(|| DomainError::not_found("user not found"))?;
        self.invalidate_listings(&[existing.domain_id, updated.domain_id])
            .await;
        Ok(updated)
    }

    /// Delete an account. Super admin only; self-deletion is rejected so the
    /// platform cannot lose its last administrator by accident.
    pub async fn delete(&self, principal: &Principal, id: i32) -> Result<(), DomainError> {
        policy::authorize(principal, Action::DeleteUser, &Target::None)?;
        if id == principal.user_id {
            return Err(DomainError::invalid_request(
                "cannot delete your own account",
            ));
        }
        let existing = self.load(id).await?;
        if !self.users.delete(id).await? {
            return Err(DomainError::not_found("user not found"));
        }
        self.invalidate_listings(&[existing.domain_id]).await;
        Ok(())
    }

    async fn load(&self, id: i32) -> Result<UserAccount, DomainError> {
        self.users
            .find(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user not found"))
    }

    async fn hash_password(&self, password: &str) -> Result<String, DomainError> {
        let password = Zeroizing::new(password.to_owned());
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(&*password, cost))
            .await
            .map_err(|err| DomainError::internal(format!("hashing task failed: {err}")))?
            .map_err(|err| DomainError::internal(format!("password hashing failed: {err}")))
    }

    async fn invalidate_listings(&self, affected_domains: &[Option<i32>]) {
        let mut keys = vec![cache_key::users(None)];
        for domain_id in affected_domains.iter().flatten() {
            let key = cache_key::users(Some(*domain_id));
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        self.reads.invalidate(&keys).await;
    }
}
