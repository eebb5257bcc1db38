//! Redis adapter for the domain's cache port.
//!
//! Every failure maps to [`CacheStoreError::Backend`]; the read model
//! downgrades those to logged misses, so a Redis outage slows reads down
//! without breaking them.

use async_trait::async_trait;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::RedisConnectionManager;

use crate::domain::ports::{CacheKey, CacheStore, CacheStoreError};

fn backend_error(err: impl std::fmt::Display) -> CacheStoreError {
    CacheStoreError::Backend {
        message: err.to_string(),
    }
}

/// Redis-backed cache store over a bb8 connection pool.
#[derive(Clone)]
pub struct RedisCacheStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCacheStore {
    /// Build the pool against the given Redis URL.
    ///
    /// Connections are established lazily, so an unreachable Redis does not
    /// block startup; the first operations fail and degrade instead.
    pub async fn connect(url: &str) -> Result<Self, CacheStoreError> {
        let manager = RedisConnectionManager::new(url).map_err(backend_error)?;
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .await
            .map_err(backend_error)?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheStoreError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        let value: Option<String> = conn.get(key.as_str()).await.map_err(backend_error)?;
        Ok(value)
    }

    async fn put(&self, key: &CacheKey, value: &str, ttl_secs: u64) -> Result<(), CacheStoreError> {
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        let _: () = conn
            .set_ex(key.as_str(), value, ttl_secs)
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    async fn delete(&self, keys: &[CacheKey]) -> Result<(), CacheStoreError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.pool.get().await.map_err(backend_error)?;
        let raw: Vec<&str> = keys.iter().map(CacheKey::as_str).collect();
        let _: () = conn.del(raw).await.map_err(backend_error)?;
        Ok(())
    }
}
