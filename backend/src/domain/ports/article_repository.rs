//! Port interface for article persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::article::Article;
use crate::domain::error::DomainError;
use crate::domain::policy::DomainScope;

/// Errors surfaced by the article persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArticleRepositoryError {
    /// Connection pool checkout or connectivity failure.
    #[error("article store connection failure: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query execution failed.
    #[error("article store query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
    /// A uniqueness constraint rejected the write.
    #[error("article store uniqueness violation: {message}")]
    Duplicate {
        /// Adapter-level failure description.
        message: String,
    },
}

impl From<ArticleRepositoryError> for DomainError {
    fn from(err: ArticleRepositoryError) -> Self {
        match err {
            ArticleRepositoryError::Connection { .. } => {
                Self::service_unavailable("article store is unavailable")
            }
            ArticleRepositoryError::Query { .. } => Self::internal("article store query failed"),
            ArticleRepositoryError::Duplicate { message } => Self::conflict(message),
        }
    }
}

/// Parameters of a public article listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicArticleFilter {
    /// Restrict to one domain.
    pub domain_id: Option<i32>,
    /// Case-insensitive title/content search term.
    pub query: Option<String>,
    /// Page size, when paginating.
    pub limit: Option<i64>,
    /// Page offset, when paginating.
    pub offset: Option<i64>,
}

/// Fields persisted when creating an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticleRecord {
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Owning domain.
    pub domain_id: i32,
    /// Fixed author.
    pub author_id: i32,
    /// Publication date.
    pub date: DateTime<Utc>,
    /// Whether the article starts in the pending state.
    pub pending_validation: bool,
}

/// Outcome of registering a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    /// Counter value after the operation.
    pub likes_count: i32,
    /// Whether this request added a new like (false for a repeat address).
    pub newly_added: bool,
}

/// Article persistence operations.
///
/// Rows come back with `domain_name` and `author_name` already resolved so
/// the domain never re-queries for display names.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Fetch one article by id.
    async fn find(&self, id: i32) -> Result<Option<Article>, ArticleRepositoryError>;

    /// Published, unarchived articles matching the public filter, newest
    /// first.
    async fn list_public(
        &self,
        filter: &PublicArticleFilter,
    ) -> Result<Vec<Article>, ArticleRepositoryError>;

    /// Every article within the scope, regardless of status.
    async fn list_all(&self, scope: DomainScope) -> Result<Vec<Article>, ArticleRepositoryError>;

    /// Articles authored by the given user.
    async fn list_by_author(
        &self,
        author_id: i32,
    ) -> Result<Vec<Article>, ArticleRepositoryError>;

    /// Archived articles within the scope.
    async fn list_archived(
        &self,
        scope: DomainScope,
    ) -> Result<Vec<Article>, ArticleRepositoryError>;

    /// Pending-validation articles within the scope.
    async fn list_pending(
        &self,
        scope: DomainScope,
    ) -> Result<Vec<Article>, ArticleRepositoryError>;

    /// Insert a new article and return it with resolved display names.
    async fn insert(&self, record: &NewArticleRecord) -> Result<Article, ArticleRepositoryError>;

    /// Persist the mutable columns of an existing article.
    async fn save(&self, article: &Article) -> Result<(), ArticleRepositoryError>;

    /// Delete an article; likes cascade at the schema level.
    async fn delete(&self, id: i32) -> Result<(), ArticleRepositoryError>;

    /// Register a like from the given address.
    ///
    /// The like row and the counter bump commit atomically; a repeat address
    /// reports the unchanged count instead of an error.
    async fn add_like(
        &self,
        article_id: i32,
        ip_address: &str,
    ) -> Result<LikeOutcome, ArticleRepositoryError>;

    /// Archive every published article dated before the cutoff. Returns the
    /// number of rows changed; already-archived rows are untouched, so the
    /// sweep is idempotent.
    async fn archive_older_than(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ArticleRepositoryError>;
}
