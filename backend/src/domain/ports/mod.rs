//! Hexagonal ports: the traits outbound adapters implement for the domain.

pub mod article_repository;
pub mod audit_log_repository;
pub mod cache_key;
pub mod cache_store;
pub mod domain_repository;
pub mod subscriber_repository;
pub mod user_repository;

pub use article_repository::{
    ArticleRepository, ArticleRepositoryError, LikeOutcome, NewArticleRecord, PublicArticleFilter,
};
pub use audit_log_repository::{AuditLogRepository, AuditLogRepositoryError};
pub use cache_key::{CacheKey, CacheKeyValidationError};
pub use cache_store::{CacheStore, CacheStoreError};
pub use domain_repository::{DomainRepository, DomainRepositoryError};
pub use subscriber_repository::{SubscriberRepository, SubscriberRepositoryError};
pub use user_repository::{
    CredentialRecord, NewUserRecord, UserRecordChanges, UserRepository, UserRepositoryError,
};
