// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Segment accessor.
//!
//! A [`Segment`] is one named hash in the backing store plus a sorted-set
//! index of its keys scored by `lastAccessTime`. The index lets
//! [`Segment::oldest`] find the eviction victim without decoding every entry;
//! when the index and the hash disagree on size (records written by another
//! process, or left from before the index existed) it falls back to a scan.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache_entry::CacheEntry;
use crate::config::SegmentConfig;
use crate::metrics;
use crate::storage::traits::{HashStore, StorageError};

/// Which tier a segment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentId {
    /// Probationary tier for fresh admissions
    Cold,
    /// Protected tier for entries with proven reuse
    Hot,
}

impl SegmentId {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentId::Cold => "cold",
            SegmentId::Hot => "hot",
        }
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Segment<V> {
    id: SegmentId,
    name: String,
    index: String,
    capacity: u64,
    store: Arc<dyn HashStore>,
    _value: PhantomData<fn() -> V>,
}

impl<V> Segment<V>
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(id: SegmentId, config: &SegmentConfig, store: Arc<dyn HashStore>) -> Self {
        Self {
            id,
            name: config.name.clone(),
            index: format!("{}:order", config.name),
            capacity: config.capacity,
            store,
            _value: PhantomData,
        }
    }

    #[must_use]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Hash name in the backing store
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sorted-set name of the access-order index
    #[must_use]
    pub fn index_name(&self) -> &str {
        &self.index
    }

    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Fetch and decode one entry. An undecodable record reads as absent.
    pub async fn get(&self, key: &str) -> Result<Option<CacheEntry<V>>, StorageError> {
        let Some(raw) = self.store.hget(&self.name, key).await? else {
            return Ok(None);
        };
        match CacheEntry::decode(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(segment = %self.id, key = %key, error = %e, "Undecodable cache record, treating as absent");
                metrics::record_decode_failure(self.id.as_str());
                Ok(None)
            }
        }
    }

    /// Write an entry and re-score it in the index.
    pub async fn put(&self, entry: &CacheEntry<V>) -> Result<(), StorageError> {
        let raw = entry.encode()?;
        self.store.hset(&self.name, &entry.key, &raw).await?;
        self.store.zadd(&self.index, &entry.key, entry.last_access_time).await
    }

    /// Remove an entry. Returns whether the record existed.
    pub async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let removed = self.store.hdel(&self.name, key).await?;
        self.store.zrem(&self.index, key).await?;
        Ok(removed)
    }

    /// Whether a record exists for `key`, decodable or not.
    pub async fn contains(&self, key: &str) -> Result<bool, StorageError> {
        self.store.hexists(&self.name, key).await
    }

    pub async fn keys(&self) -> Result<Vec<String>, StorageError> {
        self.store.hkeys(&self.name).await
    }

    pub async fn len(&self) -> Result<u64, StorageError> {
        self.store.hlen(&self.name).await
    }

    pub async fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len().await? == 0)
    }

    /// Every key paired with its decoded entry (`None` when undecodable or
    /// removed between listing and fetching).
    pub async fn entries(&self) -> Result<Vec<(String, Option<CacheEntry<V>>)>, StorageError> {
        let keys = self.keys().await?;
        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let entry = self.get(&key).await?;
            entries.push((key, entry));
        }
        Ok(entries)
    }

    /// Decodable entry with the oldest `lastAccessTime`; ties go to the
    /// smaller key. Undecodable records are never chosen.
    pub async fn oldest(&self) -> Result<Option<CacheEntry<V>>, StorageError> {
        let len = self.len().await?;
        if len == 0 {
            return Ok(None);
        }

        if self.store.zcard(&self.index).await? == len {
            if let Some(key) = self.store.zfirst(&self.index).await? {
                if let Some(entry) = self.get(&key).await? {
                    return Ok(Some(entry));
                }
            }
        }

        debug!(segment = %self.id, "Access index out of sync, scanning segment");
        self.scan_oldest().await
    }

    async fn scan_oldest(&self) -> Result<Option<CacheEntry<V>>, StorageError> {
        let entries = self.entries().await?;
        Ok(entries
            .into_iter()
            .filter_map(|(_, entry)| entry)
            .min_by(|a, b| (a.last_access_time, &a.key).cmp(&(b.last_access_time, &b.key))))
    }

    /// Drop the segment hash and its index.
    pub async fn clear(&self) -> Result<(), StorageError> {
        self.store.del(&self.name).await?;
        self.store.del(&self.index).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryHashStore;

    fn cold_segment(store: Arc<InMemoryHashStore>) -> Segment<String> {
        let config = SegmentConfig { name: "cold_cache".to_string(), capacity: 3 };
        Segment::new(SegmentId::Cold, &config, store)
    }

    fn entry(key: &str, time: i64) -> CacheEntry<String> {
        CacheEntry::new(key.to_string(), format!("value-{}", key), time)
    }

    async fn oldest_key(segment: &Segment<String>) -> Option<String> {
        segment.oldest().await.unwrap().map(|e| e.key)
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store.clone());

        segment.put(&entry("a", 1)).await.unwrap();
        assert!(segment.contains("a").await.unwrap());
        assert_eq!(segment.get("a").await.unwrap(), Some(entry("a", 1)));
        assert_eq!(segment.len().await.unwrap(), 1);
        assert_eq!(store.zcard("cold_cache:order").await.unwrap(), 1);

        assert!(segment.remove("a").await.unwrap());
        assert!(!segment.remove("a").await.unwrap());
        assert!(segment.get("a").await.unwrap().is_none());
        assert!(segment.is_empty().await.unwrap());
        assert_eq!(store.zcard("cold_cache:order").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_record_reads_as_absent() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store.clone());
        store.hset("cold_cache", "bad", "{not json").await.unwrap();

        assert!(segment.get("bad").await.unwrap().is_none());
        // Still physically present
        assert!(segment.contains("bad").await.unwrap());
        assert_eq!(segment.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_oldest_key_uses_index() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store);

        segment.put(&entry("b", 20)).await.unwrap();
        segment.put(&entry("a", 30)).await.unwrap();
        segment.put(&entry("c", 10)).await.unwrap();

        assert_eq!(oldest_key(&segment).await.as_deref(), Some("c"));

        // Re-scoring moves it out of first place
        segment.put(&entry("c", 40)).await.unwrap();
        assert_eq!(oldest_key(&segment).await.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_oldest_key_breaks_ties_by_key() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store);

        segment.put(&entry("y", 5)).await.unwrap();
        segment.put(&entry("x", 5)).await.unwrap();

        assert_eq!(oldest_key(&segment).await.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn test_oldest_key_falls_back_to_scan_without_index() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store.clone());

        // Written behind the accessor's back: no index entries
        for (key, time) in [("p", 300), ("q", 100), ("r", 200)] {
            store.hset("cold_cache", key, &entry(key, time).encode().unwrap()).await.unwrap();
        }

        assert_eq!(oldest_key(&segment).await.as_deref(), Some("q"));
    }

    #[tokio::test]
    async fn test_scan_skips_undecodable_records() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store.clone());

        segment.put(&entry("b", 2)).await.unwrap();
        segment.put(&entry("a", 1)).await.unwrap();
        store.hset("cold_cache", "0-corrupt", "???").await.unwrap();

        let oldest = segment.oldest().await.unwrap().unwrap();
        assert_eq!(oldest, entry("a", 1));
    }

    #[tokio::test]
    async fn test_only_undecodable_records_yield_no_oldest() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store.clone());
        store.hset("cold_cache", "x", "###").await.unwrap();

        assert_eq!(segment.len().await.unwrap(), 1);
        assert!(segment.oldest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_undecodable_index_head_triggers_scan() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store.clone());

        segment.put(&entry("a", 1)).await.unwrap();
        segment.put(&entry("b", 2)).await.unwrap();
        // Index and hash agree on size, but the head no longer decodes
        store.hset("cold_cache", "a", "###").await.unwrap();

        assert_eq!(oldest_key(&segment).await.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_stale_index_head_triggers_scan() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store.clone());

        segment.put(&entry("a", 5)).await.unwrap();
        segment.put(&entry("b", 9)).await.unwrap();
        // Index keeps a ghost while the hash gains an unindexed record
        store.hdel("cold_cache", "a").await.unwrap();
        store.hset("cold_cache", "c", &entry("c", 7).encode().unwrap()).await.unwrap();

        assert_eq!(oldest_key(&segment).await.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_oldest_key_of_empty_segment() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store);
        assert!(segment.oldest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entries_reports_undecodable_as_none() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store.clone());

        segment.put(&entry("ok", 1)).await.unwrap();
        store.hset("cold_cache", "bad", "nope").await.unwrap();

        let mut entries = segment.entries().await.unwrap();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(entries[0].0, "bad");
        assert!(entries[0].1.is_none());
        assert_eq!(entries[1].1.as_ref().unwrap().key, "ok");
    }

    #[tokio::test]
    async fn test_clear_drops_hash_and_index_only() {
        let store = Arc::new(InMemoryHashStore::new());
        let segment = cold_segment(store.clone());

        segment.put(&entry("a", 1)).await.unwrap();
        store.hset("unrelated", "f", "v").await.unwrap();

        segment.clear().await.unwrap();
        assert!(segment.is_empty().await.unwrap());
        assert_eq!(store.zcard("cold_cache:order").await.unwrap(), 0);
        assert!(store.hexists("unrelated", "f").await.unwrap());
    }

    #[test]
    fn test_segment_id_labels() {
        assert_eq!(SegmentId::Cold.to_string(), "cold");
        assert_eq!(SegmentId::Hot.as_str(), "hot");
    }

    #[test]
    fn test_segment_naming() {
        let segment = cold_segment(Arc::new(InMemoryHashStore::new()));
        assert_eq!(segment.id(), SegmentId::Cold);
        assert_eq!(segment.name(), "cold_cache");
        assert_eq!(segment.index_name(), "cold_cache:order");
        assert_eq!(segment.capacity(), 3);
    }
}
