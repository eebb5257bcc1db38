//! Cache-backed read model.
//!
//! Wraps a [`CacheStore`] with the degradation policy every cached read
//! shares: the datastore is the source of truth, and a cache failure is a
//! logged miss or no-op, never an error surfaced to the caller.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use super::error::DomainError;
use super::ports::{CacheKey, CacheStore};

/// Shared handle for cache-backed reads and write-through invalidation.
#[derive(Clone)]
pub struct CachedReads {
    store: Arc<dyn CacheStore>,
}

impl CachedReads {
    /// Wrap a cache adapter.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Serve from the cache, falling back to `load` and populating on miss.
    ///
    /// Backend failures and undecodable payloads both count as misses; the
    /// post-load population is best-effort.
    pub async fn get_or_load<T, F, Fut>(
        &self,
        key: &CacheKey,
        ttl_secs: u64,
        load: F,
    ) -> Result<T, DomainError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, DomainError>>,
    {
        match self.store.get(key).await {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(key = %key, error = %err, "discarding undecodable cache payload");
                }
            },
            Ok(None) => {}
            Err(err) => {
                warn!(key = %key, error = %err, "cache read failed, falling back to datastore");
            }
        }

        let value = load().await?;
        match serde_json::to_string(&value) {
            Ok(payload) => {
                if let Err(err) = self.store.put(key, &payload, ttl_secs).await {
                    warn!(key = %key, error = %err, "cache population failed");
                }
            }
            Err(err) => {
                warn!(key = %key, error = %err, "cache payload serialisation failed");
            }
        }
        Ok(value)
    }

    /// Best-effort invalidation; failures are logged and swallowed so writes
    /// never fail because of the cache.
    pub async fn invalidate(&self, keys: &[CacheKey]) {
        if keys.is_empty() {
            return;
        }
        if let Err(err) = self.store.delete(keys).await {
            warn!(count = keys.len(), error = %err, "cache invalidation failed");
        }
    }
}
