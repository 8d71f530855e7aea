use crate::models::Profile;
use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
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
}

/// Two-tier profile cache.
///
/// L1 is a per-process moka cache, L2 is Redis shared by every instance.
/// Both tiers expire entries after the same TTL. Writes go to both; reads
/// fall through L1 to L2 and backfill L1 on an L2 hit.
pub struct CacheManager {
    redis: Arc<tokio::sync::Mutex<ConnectionManager>>,
    l1_cache: moka::future::Cache<String, Arc<str>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Ok(Self {
            redis: Arc::new(tokio::sync::Mutex::new(redis)),
            l1_cache,
            ttl_secs,
        })
    }

    /// Look a key up in L1, then L2. `Ok(None)` on a miss in both tiers.
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        if let Some(json) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(Some(serde_json::from_str(&json)?));
        }

        let value: Option<String> = {
            let mut conn = self.redis.lock().await;
            redis::cmd("GET").arg(key).query_async(&mut *conn).await?
        };

        match value {
            Some(json) => {
                tracing::trace!("L2 cache hit: {}", key);
                let parsed = serde_json::from_str(&json)?;
                self.l1_cache.insert(key.to_string(), Arc::from(json)).await;
                Ok(Some(parsed))
            }
            None => {
                tracing::trace!("Cache miss: {}", key);
                Ok(None)
            }
        }
    }

    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        {
            let mut conn = self.redis.lock().await;
            redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(&json)
                .query_async::<()>(&mut *conn)
                .await?;
        }
        self.l1_cache.insert(key.to_string(), Arc::from(json)).await;

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Drop a key from both tiers
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.l1_cache.invalidate(key).await;
        let mut conn = self.redis.lock().await;
        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, CacheError> {
        self.get(&CacheKey::profile(user_id)).await
    }

    pub async fn put_profile(&self, profile: &Profile) -> Result<(), CacheError> {
        self.set(&CacheKey::profile(&profile.user_id), profile).await
    }

    /// Called after any write that changes what matching sees for a user
    /// (preferences, boost state)
    pub async fn invalidate_profile(&self, user_id: &str) -> Result<(), CacheError> {
        tracing::debug!("Invalidating cached profile for {}", user_id);
        self.delete(&CacheKey::profile(user_id)).await
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.redis.lock().await;
        redis::cmd("PING").query_async::<()>(&mut *conn).await?;
        Ok(())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            l1_entries: self.l1_cache.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub l1_entries: u64,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    const PREFIX: &'static str = "matrimony";

    /// Materialized profile, keyed by user id
    pub fn profile(user_id: &str) -> String {
        format!("{}:profile:{}", Self::PREFIX, user_id)
    }
}
