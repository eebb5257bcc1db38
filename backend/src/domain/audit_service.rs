//! Audit trail reads.

use std::sync::Arc;

use super::audit::AuditLogEntry;
use super::error::DomainError;
use super::identity::Principal;
use super::policy::{self, Action, Target};
use super::ports::AuditLogRepository;

/// Default number of entries returned when the caller does not say.
pub const DEFAULT_AUDIT_LIMIT: i64 = 100;
/// Hard ceiling on a single audit page.
pub const MAX_AUDIT_LIMIT: i64 = 1000;

/// Read access to the session audit trail.
pub struct AuditService {
    audit: Arc<dyn AuditLogRepository>,
}

impl AuditService {
    /// Assemble the service over its port.
    pub fn new(audit: Arc<dyn AuditLogRepository>) -> Self {
        Self { audit }
    }

    /// Most recent entries, newest first. Super admin only.
    pub async fn list_recent(
        &self,
        principal: &Principal,
        limit: Option<i64>,
    ) -> Result<Vec<AuditLogEntry>, DomainError> {
        policy::authorize(principal, Action::ViewAuditLog, &Target::None)?;
        let limit = limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT);
        Ok(self.audit.list_recent(limit).await?)
    }
}
