//! Diesel-async PostgreSQL adapters for the domain's persistence ports.

pub mod diesel_article_repository;
pub mod diesel_audit_log_repository;
pub mod diesel_domain_repository;
pub mod diesel_subscriber_repository;
pub mod diesel_user_repository;
pub mod error_mapping;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_article_repository::DieselArticleRepository;
pub use diesel_audit_log_repository::DieselAuditLogRepository;
pub use diesel_domain_repository::DieselDomainRepository;
pub use diesel_subscriber_repository::DieselSubscriberRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
