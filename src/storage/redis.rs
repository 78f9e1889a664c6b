//! Redis backend for the segment hashes.
//!
//! Each segment is a Redis HASH (`HGET`/`HSET`/`HDEL`/`HKEYS`/`HLEN`) and its
//! access-order index is a ZSET scored by last access time:
//!
//! ```text
//! cold_cache        HASH  key -> {"key":..,"value":..,"lastAccessTime":..,"frequency":..}
//! cold_cache:order  ZSET  key @ lastAccessTime
//! hot_cache         HASH
//! hot_cache:order   ZSET
//! ```
//!
//! Queries are not retried. `ConnectionManager` reconnects in the background,
//! but a failed command is reported to the caller as-is.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{cmd, AsyncCommands, Client};
use tracing::info;
use super::traits::{HashStore, StorageError};

pub struct RedisHashStore {
    connection: ConnectionManager,
    /// Optional key prefix for namespacing (e.g., "myapp:" → "myapp:cold_cache")
    prefix: String,
}

fn backend(e: redis::RedisError) -> StorageError {
    StorageError::Backend(e.to_string())
}

impl RedisHashStore {
    /// Connect without a key prefix.
    pub async fn new(connection_string: &str) -> Result<Self, StorageError> {
        Self::with_prefix(connection_string, None).await
    }

    /// Connect with an optional key prefix.
    ///
    /// The prefix is prepended to every collection name, so several caches
    /// can share one Redis database.
    ///
    /// ```rust,no_run
    /// # use slru_cache::storage::redis::RedisHashStore;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// // Collections become "myapp:cold_cache", "myapp:hot_cache", ...
    /// let store = RedisHashStore::with_prefix("redis://localhost", Some("myapp:")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_prefix(connection_string: &str, prefix: Option<&str>) -> Result<Self, StorageError> {
        let client = Client::open(connection_string).map_err(backend)?;
        let connection = ConnectionManager::new(client).await.map_err(backend)?;
        info!(prefix = prefix.unwrap_or(""), "Connected to Redis");

        Ok(Self {
            connection,
            prefix: prefix.unwrap_or("").to_string(),
        })
    }

    #[inline]
    fn prefixed_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{}", self.prefix, key)
        }
    }

    /// Get a clone of the connection manager
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

#[async_trait]
impl HashStore for RedisHashStore {
    async fn hget(&self, hash: &str, field: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection.clone();
        conn.hget(self.prefixed_key(hash), field).await.map_err(backend)
    }

    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self.connection.clone();
        let _: () = conn.hset(self.prefixed_key(hash), field, value).await.map_err(backend)?;
        Ok(())
    }

    async fn hdel(&self, hash: &str, field: &str) -> Result<bool, StorageError> {
        let mut conn = self.connection.clone();
        let removed: u64 = conn.hdel(self.prefixed_key(hash), field).await.map_err(backend)?;
        Ok(removed > 0)
    }

    async fn hexists(&self, hash: &str, field: &str) -> Result<bool, StorageError> {
        let mut conn = self.connection.clone();
        conn.hexists(self.prefixed_key(hash), field).await.map_err(backend)
    }

    async fn hkeys(&self, hash: &str) -> Result<Vec<String>, StorageError> {
        let mut conn = self.connection.clone();
        conn.hkeys(self.prefixed_key(hash)).await.map_err(backend)
    }

    async fn hlen(&self, hash: &str) -> Result<u64, StorageError> {
        let mut conn = self.connection.clone();
        conn.hlen(self.prefixed_key(hash)).await.map_err(backend)
    }

    async fn zadd(&self, set: &str, member: &str, score: i64) -> Result<(), StorageError> {
        let mut conn = self.connection.clone();
        let _: () = conn.zadd(self.prefixed_key(set), member, score).await.map_err(backend)?;
        Ok(())
    }

    async fn zrem(&self, set: &str, member: &str) -> Result<bool, StorageError> {
        let mut conn = self.connection.clone();
        let removed: u64 = conn.zrem(self.prefixed_key(set), member).await.map_err(backend)?;
        Ok(removed > 0)
    }

    async fn zcard(&self, set: &str) -> Result<u64, StorageError> {
        let mut conn = self.connection.clone();
        conn.zcard(self.prefixed_key(set)).await.map_err(backend)
    }

    async fn zfirst(&self, set: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connection.clone();
        // Redis orders equal scores lexicographically by member
        let members: Vec<String> = conn.zrange(self.prefixed_key(set), 0, 0).await.map_err(backend)?;
        Ok(members.into_iter().next())
    }

    async fn del(&self, name: &str) -> Result<(), StorageError> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(self.prefixed_key(name)).await.map_err(backend)?;
        Ok(())
    }

    async fn flush_all(&self) -> Result<(), StorageError> {
        let mut conn = self.connection.clone();
        cmd("FLUSHDB").query_async::<()>(&mut conn).await.map_err(backend)
    }
}

