//! Cache key type and the deterministic key scheme for the read model.
//!
//! Every cached payload lives under a key built here, so invalidation and
//! population can never disagree about spelling.

use thiserror::Error;

/// Time-to-live for cached article payloads, in seconds.
pub const ARTICLES_TTL_SECS: u64 = 300;
/// Time-to-live for cached user listings, in seconds.
pub const USERS_TTL_SECS: u64 = 900;
/// Time-to-live for the cached domain listing, in seconds.
pub const DOMAINS_TTL_SECS: u64 = 3600;

/// A validated cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Construct a cache key after validating that it is non-empty and
    /// carries no surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    // Builders below assemble keys from validated fragments.
    fn from_built(value: String) -> Self {
        Self(value)
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("cache key must not be empty")]
    Empty,
    /// Key contains leading or trailing whitespace.
    #[error("cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}

/// Key for a single article payload.
pub fn article_item(id: i32) -> CacheKey {
    CacheKey::from_built(format!("news:item:{id}"))
}

/// Key for a public article listing variant.
///
/// The unfiltered listing is `news:public`; domain, search, limit, and
/// offset each append their own segment, so distinct request shapes never
/// share a cache entry. Limit and offset are encoded independently because
/// the repository applies them independently; a limit-only page must not
/// collide with the unfiltered listing.
pub fn public_articles(
    domain_id: Option<i32>,
    query: Option<&str>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> CacheKey {
    let mut key = String::from("news:public");
    if let Some(domain_id) = domain_id {
        key.push_str(&format!(":domain:{domain_id}"));
    }
    if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
        key.push_str(&format!(":q:{query}"));
    }
    if let Some(limit) = limit {
        key.push_str(&format!(":l:{limit}"));
    }
    if let Some(offset) = offset {
        key.push_str(&format!(":o:{offset}"));
    }
    CacheKey::from_built(key)
}

fn scoped(prefix: &str, domain_id: Option<i32>) -> CacheKey {
    CacheKey::from_built(match domain_id {
        Some(domain_id) => format!("{prefix}:domain:{domain_id}"),
        None => format!("{prefix}:all"),
    })
}

/// Key for the admin listing, unfiltered or per domain.
pub fn admin_articles(domain_id: Option<i32>) -> CacheKey {
    scoped("news:admin", domain_id)
}

/// Key for a contributor's own-article listing.
pub fn contributor_articles(author_id: i32) -> CacheKey {
    CacheKey::from_built(format!("news:contributor:{author_id}"))
}

/// Key for the archived listing, unfiltered or per domain.
pub fn archived_articles(domain_id: Option<i32>) -> CacheKey {
    scoped("news:archived", domain_id)
}

/// Key for the pending-validation listing, unfiltered or per domain.
pub fn pending_articles(domain_id: Option<i32>) -> CacheKey {
    scoped("news:pending", domain_id)
}

/// Key for the full domain listing.
pub fn all_domains() -> CacheKey {
    CacheKey::from_built("domains:all".to_owned())
}

/// Key for a user listing, unfiltered or per domain.
pub fn users(domain_id: Option<i32>) -> CacheKey {
    scoped("users", domain_id)
}

/// Every enumerable key an article write can stale.
///
/// Filtered and paginated public variants are unbounded and left to expire
/// via their TTL.
pub fn article_invalidation_set(id: i32, domain_id: i32, author_id: i32) -> Vec<CacheKey> {
    vec![
        article_item(id),
        public_articles(None, None, None, None),
        public_articles(Some(domain_id), None, None, None),
        admin_articles(None),
        admin_articles(Some(domain_id)),
        contributor_articles(author_id),
        archived_articles(None),
        archived_articles(Some(domain_id)),
        pending_articles(None),
        pending_articles(Some(domain_id)),
    ]
}
