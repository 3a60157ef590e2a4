use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Multi-tier cache manager for profile-store reads
///
/// L1 (in-memory) is always present. L2 (Redis) is shared across instances
/// and optional: without it the manager behaves as a local TTL cache.
pub struct CacheManager {
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = redis::aio::ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            l1_cache: build_l1(l1_size, ttl_secs),
            ttl_secs,
        })
    }

    /// Create an in-process cache with no Redis tier
    pub fn l1_only(l1_size: u64, ttl_secs: u64) -> Self {
        Self {
            redis: None,
            l1_cache: build_l1(l1_size, ttl_secs),
            ttl_secs,
        }
    }

    pub fn has_redis(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let Some(redis) = &self.redis else {
            tracing::trace!("Cache miss: {}", key);
            return Err(CacheError::CacheMiss(key.to_string()));
        };

        let mut conn = redis.lock().await;
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut *conn)
            .await?;
        drop(conn);

        if let Some(json) = value {
            tracing::trace!("L2 cache hit: {}", key);

            // Populate L1 cache
            self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;

            return Ok(serde_json::from_str(&json)?);
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in cache (both tiers)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Delete a value from both cache tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            redis::cmd("DEL")
                .arg(key)
                .query_async::<()>(&mut *conn)
                .await?;
        }
        Ok(())
    }

    /// Invalidate every entry whose key starts with `prefix`
    pub async fn invalidate_prefix(&self, prefix: &str) -> Result<(), CacheError> {
        let owned = prefix.to_string();
        // moka only errors here when invalidation closures are disabled
        if let Err(e) = self.l1_cache.invalidate_entries_if(move |k, _| k.starts_with(&owned)) {
            tracing::warn!("L1 predicate invalidation unavailable, clearing L1: {}", e);
            self.l1_cache.invalidate_all();
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.lock().await;
            let keys: Vec<String> = redis::cmd("KEYS")
                .arg(format!("{}*", prefix))
                .query_async(&mut *conn)
                .await?;

            if !keys.is_empty() {
                redis::cmd("DEL")
                    .arg(keys)
                    .query_async::<()>(&mut *conn)
                    .await?;
            }
        }

        tracing::debug!("Invalidated cache prefix: {}", prefix);
        Ok(())
    }
}

fn build_l1(l1_size: u64, ttl_secs: u64) -> moka::future::Cache<String, Vec<u8>> {
    moka::future::CacheBuilder::new(l1_size)
        .time_to_live(Duration::from_secs(ttl_secs))
        .support_invalidation_closures()
        .build()
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Prefix shared by every cached candidate pool
    pub const ALL_POOLS: &'static str = "pool:";

    /// Build a cache key for a user profile
    pub fn profile(uid: &str) -> String {
        format!("profile:{}", uid)
    }

    /// Prefix shared by every candidate pool cached for a requester
    pub fn pool_prefix(uid: &str) -> String {
        format!("{}{}:", Self::ALL_POOLS, uid)
    }

    /// Build a cache key for a requester's filtered candidate pool
    pub fn pool(uid: &str, filter_fingerprint: &str) -> String {
        format!("{}{}", Self::pool_prefix(uid), filter_fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_redis_cache_set_get() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        let key = "test_key";
        let value = "test_value";

        cache.set(key, &value).await.unwrap();
        let result: String = cache.get(key).await.unwrap();
        assert_eq!(result, value);

        cache.delete(key).await.unwrap();
        assert!(cache.get::<String>(key).await.is_err());
    }

    #[tokio::test]
    async fn test_l1_only_set_get_delete() {
        let cache = CacheManager::l1_only(100, 60);
        assert!(!cache.has_redis());

        cache.set("profile:u1", &vec!["Guitar".to_string()]).await.unwrap();
        let skills: Vec<String> = cache.get("profile:u1").await.unwrap();
        assert_eq!(skills, vec!["Guitar"]);

        cache.delete("profile:u1").await.unwrap();
        assert!(matches!(
            cache.get::<Vec<String>>("profile:u1").await,
            Err(CacheError::CacheMiss(_))
        ));
    }

    #[tokio::test]
    async fn test_invalidate_prefix() {
        let cache = CacheManager::l1_only(100, 60);
        cache.set(&CacheKey::pool("u1", "a"), &1u32).await.unwrap();
        cache.set(&CacheKey::pool("u2", "a"), &2u32).await.unwrap();

        cache.invalidate_prefix(&CacheKey::pool_prefix("u1")).await.unwrap();
        // Predicate invalidation is applied lazily by moka; flush it
        cache.l1_cache.run_pending_tasks().await;

        assert!(cache.get::<u32>(&CacheKey::pool("u1", "a")).await.is_err());
        assert_eq!(cache.get::<u32>(&CacheKey::pool("u2", "a")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_all_pools_keeps_profiles() {
        let cache = CacheManager::l1_only(100, 60);
        cache.set(&CacheKey::pool("u1", "a"), &1u32).await.unwrap();
        cache.set(&CacheKey::pool("u2", "b"), &2u32).await.unwrap();
        cache.set(&CacheKey::profile("u1"), &3u32).await.unwrap();

        cache.invalidate_prefix(CacheKey::ALL_POOLS).await.unwrap();
        cache.l1_cache.run_pending_tasks().await;

        assert!(cache.get::<u32>(&CacheKey::pool("u1", "a")).await.is_err());
        assert!(cache.get::<u32>(&CacheKey::pool("u2", "b")).await.is_err());
        assert_eq!(cache.get::<u32>(&CacheKey::profile("u1")).await.unwrap(), 3);
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::profile("user123"), "profile:user123");
        assert_eq!(CacheKey::pool_prefix("user123"), "pool:user123:");
        assert_eq!(CacheKey::pool("user123", "t=|l=|loc="), "pool:user123:t=|l=|loc=");
    }
}
