use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Backing-store contract: a set of named collections living in one shared
/// keyspace. Hash collections hold the segment entries, sorted sets hold the
/// per-segment access-order index.
///
/// Implementations must not retry; failures surface as [`StorageError::Backend`].
#[async_trait]
pub trait HashStore: Send + Sync {
    /// Read one field of a hash.
    async fn hget(&self, hash: &str, field: &str) -> Result<Option<String>, StorageError>;
    /// Write (insert or overwrite) one field of a hash.
    async fn hset(&self, hash: &str, field: &str, value: &str) -> Result<(), StorageError>;
    /// Delete one field. Returns whether the field existed.
    async fn hdel(&self, hash: &str, field: &str) -> Result<bool, StorageError>;
    async fn hexists(&self, hash: &str, field: &str) -> Result<bool, StorageError>;
    /// All field names of a hash, in no particular order.
    async fn hkeys(&self, hash: &str) -> Result<Vec<String>, StorageError>;
    async fn hlen(&self, hash: &str) -> Result<u64, StorageError>;

    /// Add or re-score a sorted-set member.
    async fn zadd(&self, set: &str, member: &str, score: i64) -> Result<(), StorageError>;
    async fn zrem(&self, set: &str, member: &str) -> Result<bool, StorageError>;
    async fn zcard(&self, set: &str) -> Result<u64, StorageError>;
    /// Lowest-scored member. Equal scores order by member, ascending.
    async fn zfirst(&self, set: &str) -> Result<Option<String>, StorageError>;

    /// Delete a whole collection (hash or sorted set).
    async fn del(&self, name: &str) -> Result<(), StorageError>;
    /// Empty the entire store, including collections this crate does not own.
    async fn flush_all(&self) -> Result<(), StorageError>;
}
