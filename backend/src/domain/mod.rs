//! Transport-agnostic core: entities, the authorization policy, and the
//! use-case services, all expressed over hexagonal ports.

pub mod article;
pub mod article_service;
pub mod audit;
pub mod audit_service;
pub mod auth;
pub mod auth_service;
pub mod domain_service;
pub mod domains;
pub mod error;
pub mod identity;
pub mod policy;
pub mod ports;
pub mod read_model;
pub mod retention;
pub mod role;
pub mod subscriber_service;
pub mod subscribers;
pub mod tokens;
pub mod user_account;
pub mod user_service;

pub use article::{Article, ArticleDraft, ArticleEdit, ArticleStatus};
pub use article_service::ArticleService;
pub use audit::{AuditAction, AuditLogEntry, ClientMeta};
pub use audit_service::AuditService;
pub use auth::LoginCredentials;
pub use auth_service::{AuthService, Session};
pub use domain_service::DomainService;
pub use domains::{Domain, DomainDraft};
pub use error::{DomainError, ErrorCode};
pub use identity::Principal;
pub use policy::DomainScope;
pub use read_model::CachedReads;
pub use role::Role;
pub use subscriber_service::SubscriberService;
pub use subscribers::{Subscriber, SubscriberDraft};
pub use tokens::{TokenCodec, TokenPair, VerifiedAccess};
pub use user_account::{UserAccount, UserDraft, UserUpdate};
pub use user_service::UserService;
