//! Port interface for the key-value cache backing the read model.

use async_trait::async_trait;
use thiserror::Error;

use super::CacheKey;

/// Errors surfaced by the cache adapter.
///
/// The read model downgrades every one of these to a logged miss or no-op;
/// they never propagate to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheStoreError {
    /// Cache backend is unavailable or timing out.
    #[error("cache backend failure: {message}")]
    Backend {
        /// Adapter-level failure description.
        message: String,
    },
}

/// Key-value cache with per-entry expiry. Values are serialised JSON.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a cached payload.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheStoreError>;

    /// Store a payload with a time-to-live in seconds.
    async fn put(&self, key: &CacheKey, value: &str, ttl_secs: u64) -> Result<(), CacheStoreError>;

    /// Delete the given keys. Missing keys are not an error.
    async fn delete(&self, keys: &[CacheKey]) -> Result<(), CacheStoreError>;
}
