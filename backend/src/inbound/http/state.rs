//! Shared application state handed to HTTP handlers.

use std::sync::Arc;

use crate::domain::{
    ArticleService, AuditService, AuthService, DomainService, SubscriberService, TokenCodec,
    UserService,
};

/// Cookie attributes derived from configuration.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    /// Whether cookies carry the `Secure` attribute.
    pub secure: bool,
    /// Access cookie lifetime in seconds.
    pub access_ttl_secs: i64,
    /// Refresh cookie lifetime in seconds.
    pub refresh_ttl_secs: i64,
}

/// Service handles shared across handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Session issuance and verification.
    pub auth: Arc<AuthService>,
    /// Article use-cases.
    pub articles: Arc<ArticleService>,
    /// Domain use-cases.
    pub domains: Arc<DomainService>,
    /// User account use-cases.
    pub users: Arc<UserService>,
    /// Newsletter subscription use-cases.
    pub subscribers: Arc<SubscriberService>,
    /// Audit trail reads.
    pub audit: Arc<AuditService>,
    /// Token codec, used by the principal extractors.
    pub tokens: Arc<TokenCodec>,
    /// Cookie attributes.
    pub cookies: CookiePolicy,
}
