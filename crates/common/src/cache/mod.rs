//! Cache backends for validation results
//!
//! Provides:
//! - The [`TtlCache`] trait the caching validator is generic over
//! - [`RedisCache`]: shared cache across edge instances
//! - [`MemoryCache`]: bounded in-process cache (no-redis deployments, tests)

use crate::errors::{AppError, Result};
use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// A string cache with per-entry TTL semantics.
///
/// Values are serialized by callers; backends only see opaque strings.
#[async_trait]
pub trait TtlCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> Result<Option<String>>;
    async fn set_raw(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Redis cache client
pub struct RedisCache {
    connection: RwLock<MultiplexedConnection>,
    key_prefix: String,
}

impl RedisCache {
    /// Create a new cache client
    pub async fn new(url: &str, key_prefix: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| AppError::CacheError {
            message: format!("Failed to create Redis client: {}", e),
        })?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to connect to Redis: {}", e),
            })?;

        Ok(Self {
            connection: RwLock::new(connection),
            key_prefix: key_prefix.to_string(),
        })
    }

    /// Build a prefixed key
    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    /// Ping Redis to check connectivity
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection.write().await;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Redis ping failed: {}", e),
            })?;
        Ok(())
    }
}

#[async_trait]
impl TtlCache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let full_key = self.key(key);
        let mut conn = self.connection.write().await;

        let value: Option<String> =
            conn.get(&full_key).await.map_err(|e| AppError::CacheError {
                message: format!("Failed to get key '{}': {}", full_key, e),
            })?;

        debug!(key = %full_key, hit = value.is_some(), "Cache get");
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let full_key = self.key(key);
        let mut conn = self.connection.write().await;

        let _: () = conn
            .set_ex(&full_key, value, ttl_secs)
            .await
            .map_err(|e| AppError::CacheError {
                message: format!("Failed to set key '{}': {}", full_key, e),
            })?;

        debug!(key = %full_key, ttl_secs, "Cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let full_key = self.key(key);
        let mut conn = self.connection.write().await;

        let deleted: i32 = conn.del(&full_key).await.map_err(|e| AppError::CacheError {
            message: format!("Failed to delete key '{}': {}", full_key, e),
        })?;

        debug!(key = %full_key, deleted = deleted > 0, "Cache delete");
        Ok(deleted > 0)
    }
}

struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

/// Bounded in-process cache with per-entry expiry
pub struct MemoryCache {
    entries: RwLock<HashMap<String, MemoryEntry>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl TtlCache for MemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        entries.retain(|_, entry| now < entry.expires_at);

        // Still full after pruning: evict the entry closest to expiry
        if entries.len() >= self.max_entries && !entries.contains_key(key) {
            if let Some(evict) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&evict);
            }
        }

        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: now + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some())
    }
}

/// Cache key builder helpers
pub mod keys {
    /// Build a tenant validation cache key
    pub fn tenant(slug: &str) -> String {
        format!("tenant:{}", slug)
    }

    /// Build a feature-set cache key
    pub fn features(slug: &str) -> String {
        format!("features:{}", slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_builders() {
        assert_eq!(keys::tenant("kardesler"), "tenant:kardesler");
        assert_eq!(keys::features("kardesler"), "features:kardesler");
    }

    #[test]
    fn test_memory_cache_set_get() {
        tokio_test::block_on(async {
            let cache = MemoryCache::new(16);
            cache.set_raw("tenant:abc", "value", 60).await.unwrap();
            assert_eq!(
                cache.get_raw("tenant:abc").await.unwrap(),
                Some("value".to_string())
            );
            assert_eq!(cache.get_raw("tenant:other").await.unwrap(), None);
        });
    }

    #[test]
    fn test_memory_cache_expiry() {
        tokio_test::block_on(async {
            let cache = MemoryCache::new(16);
            cache.set_raw("tenant:abc", "value", 0).await.unwrap();
            assert_eq!(cache.get_raw("tenant:abc").await.unwrap(), None);
        });
    }

    #[test]
    fn test_memory_cache_eviction_bound() {
        tokio_test::block_on(async {
            let cache = MemoryCache::new(2);
            cache.set_raw("a", "1", 60).await.unwrap();
            cache.set_raw("b", "2", 120).await.unwrap();
            cache.set_raw("c", "3", 180).await.unwrap();

            let entries = cache.entries.read().await;
            assert_eq!(entries.len(), 2);
            // The entry closest to expiry was evicted
            assert!(!entries.contains_key("a"));
        });
    }

    #[test]
    fn test_memory_cache_delete() {
        tokio_test::block_on(async {
            let cache = MemoryCache::new(16);
            cache.set_raw("a", "1", 60).await.unwrap();
            assert!(cache.delete("a").await.unwrap());
            assert!(!cache.delete("a").await.unwrap());
        });
    }
}
