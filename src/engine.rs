// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Segmented-LRU policy engine.
//!
//! The [`SlruEngine`] drives two [`Segment`]s over one shared [`HashStore`]:
//!
//! ```text
//!            set(k, v)                     get(k): freq > threshold
//!   ───────────────────────▶  COLD  ────────────────────────────────▶  HOT
//!                              │  ◀──────────────────────────────────  │
//!                              │      hot over capacity: demote oldest │
//!                              ▼                                       │
//!              cold over capacity: evict oldest (discarded)          (get: touch only)
//! ```
//!
//! Capacity is enforced reactively after every admission and promotion:
//! first cold is trimmed by one entry, then hot demotes one entry into cold.
//! Unless `cascade_demotion_eviction` is set, the demoted entry is not
//! followed by a second cold trim in the same pass.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use slru_cache::{InMemoryHashStore, SetOutcome, SlruConfig, SlruEngine};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryHashStore::new());
//! let engine: SlruEngine<String> = SlruEngine::new(store, SlruConfig::default())?;
//!
//! assert_eq!(engine.set("a", "alpha".to_string()).await?, SetOutcome::Admitted);
//! assert_eq!(engine.set("a", "other".to_string()).await?, SetOutcome::AlreadyPresent);
//!
//! // Two reads push frequency past the threshold of 1
//! engine.get("a").await?;
//! assert_eq!(engine.get("a").await?.as_deref(), Some("alpha"));
//!
//! let status = engine.status().await?;
//! assert_eq!(status.hot_keys().collect::<Vec<_>>(), vec!["a"]);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache_entry::CacheEntry;
use crate::clock::{Clock, SystemClock};
use crate::config::{ClearScope, ConfigError, SlruConfig};
use crate::metrics;
use crate::segment::{Segment, SegmentId};
use crate::status::CacheStatus;
use crate::storage::redis::RedisHashStore;
use crate::storage::traits::{HashStore, StorageError};

/// Result of [`SlruEngine::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// New entry written to the cold segment
    Admitted,
    /// Key already cached in either segment; nothing changed
    AlreadyPresent,
}

/// Failure to build an engine from configuration.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("no redis_url configured")]
    MissingRedisUrl,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Two-tier cache policy over a shared hash store.
///
/// Operations on one engine are serialized by an internal async mutex, so
/// each read-modify-write sequence sees a consistent view of the segments.
/// Several engines sharing a store get no such guarantee.
pub struct SlruEngine<V> {
    config: SlruConfig,
    store: Arc<dyn HashStore>,
    cold: Segment<V>,
    hot: Segment<V>,
    clock: Arc<dyn Clock>,
    op_lock: Mutex<()>,
}

impl<V> SlruEngine<V>
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    /// Create an engine using the wall clock.
    pub fn new(store: Arc<dyn HashStore>, config: SlruConfig) -> Result<Self, ConfigError> {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Create an engine with an injected time source.
    pub fn with_clock(
        store: Arc<dyn HashStore>,
        config: SlruConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let cold = Segment::new(SegmentId::Cold, &config.cold, store.clone());
        let hot = Segment::new(SegmentId::Hot, &config.hot, store.clone());
        Ok(Self {
            config,
            store,
            cold,
            hot,
            clock,
            op_lock: Mutex::new(()),
        })
    }

    /// Connect to the Redis instance named by `config.redis_url`.
    pub async fn connect(config: SlruConfig) -> Result<Self, StartupError> {
        config.validate()?;
        let url = config.redis_url.as_deref().ok_or(StartupError::MissingRedisUrl)?;
        info!(url = %url, "Connecting SLRU engine to Redis...");
        let store = RedisHashStore::with_prefix(url, config.redis_prefix.as_deref()).await?;
        Ok(Self::new(Arc::new(store), config)?)
    }

    #[must_use]
    pub fn config(&self) -> &SlruConfig {
        &self.config
    }

    #[must_use]
    pub fn cold(&self) -> &Segment<V> {
        &self.cold
    }

    #[must_use]
    pub fn hot(&self) -> &Segment<V> {
        &self.hot
    }

    /// Look up `key`, hot segment first.
    ///
    /// A hit counts as one access. A cold hit whose frequency passes the
    /// promotion threshold moves the entry to hot. A miss creates nothing.
    #[tracing::instrument(skip(self), fields(segment))]
    pub async fn get(&self, key: &str) -> Result<Option<V>, StorageError> {
        let _guard = self.op_lock.lock().await;

        if let Some(mut entry) = self.hot.get(key).await? {
            tracing::Span::current().record("segment", "hot");
            entry.accessed(self.clock.now_millis());
            self.hot.put(&entry).await?;
            debug!(key = %key, frequency = entry.frequency, "Cache hit in hot segment");
            metrics::record_hit(SegmentId::Hot.as_str());
            return Ok(Some(entry.value));
        }
        debug!(key = %key, "Cache miss in hot segment");

        if let Some(mut entry) = self.cold.get(key).await? {
            tracing::Span::current().record("segment", "cold");
            entry.accessed(self.clock.now_millis());
            debug!(key = %key, frequency = entry.frequency, "Cache hit in cold segment");
            metrics::record_hit(SegmentId::Cold.as_str());

            if entry.frequency > self.config.promotion_threshold {
                self.promote(&entry).await?;
            } else {
                self.cold.put(&entry).await?;
            }
            return Ok(Some(entry.value));
        }

        tracing::Span::current().record("segment", "miss");
        debug!(key = %key, "Cache miss in cold segment");
        metrics::record_miss();
        Ok(None)
    }

    /// Admit `value` under `key` into the cold segment.
    ///
    /// Never overwrites: if `key` is already cached in either segment the
    /// existing entry is left untouched.
    #[tracing::instrument(skip(self, value))]
    pub async fn set(&self, key: &str, value: V) -> Result<SetOutcome, StorageError> {
        let _guard = self.op_lock.lock().await;

        if self.hot.contains(key).await? || self.cold.contains(key).await? {
            debug!(key = %key, "Key already cached, set ignored");
            metrics::record_set("already_present");
            return Ok(SetOutcome::AlreadyPresent);
        }

        let entry = CacheEntry::new(key.to_string(), value, self.clock.now_millis());
        self.cold.put(&entry).await?;
        debug!(key = %key, "Admitted to cold segment");
        metrics::record_set("admitted");

        self.enforce_capacity().await?;
        Ok(SetOutcome::Admitted)
    }

    /// Keys, frequencies and access times of both segments.
    #[tracing::instrument(skip(self))]
    pub async fn status(&self) -> Result<CacheStatus, StorageError> {
        let cold = self.cold.entries().await?;
        let hot = self.hot.entries().await?;

        metrics::set_segment_entries(SegmentId::Cold.as_str(), cold.len() as u64);
        metrics::set_segment_entries(SegmentId::Hot.as_str(), hot.len() as u64);

        Ok(CacheStatus::from_entries(cold, hot))
    }

    /// Remove every cached entry, scoped by `config.clear_scope`.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.op_lock.lock().await;

        match self.config.clear_scope {
            ClearScope::FlushAll => {
                warn!("Flushing the entire backing store");
                self.store.flush_all().await?;
            }
            ClearScope::Segments => {
                self.cold.clear().await?;
                self.hot.clear().await?;
                info!(cold = %self.cold.name(), hot = %self.hot.name(), "Cleared cache segments");
            }
        }
        metrics::record_clear();
        Ok(())
    }

    async fn promote(&self, entry: &CacheEntry<V>) -> Result<(), StorageError> {
        info!(key = %entry.key, frequency = entry.frequency, "Promoting to hot segment");
        self.hot.put(entry).await?;
        self.cold.remove(&entry.key).await?;
        metrics::record_promotion();
        self.enforce_capacity().await
    }

    async fn enforce_capacity(&self) -> Result<(), StorageError> {
        self.trim_cold().await?;

        if self.hot.len().await? <= self.hot.capacity() {
            return Ok(());
        }
        let Some(victim) = self.hot.oldest().await? else {
            return Ok(());
        };
        info!(key = %victim.key, "Demoting from hot to cold segment");
        self.hot.remove(&victim.key).await?;
        self.cold.put(&victim).await?;
        metrics::record_demotion();

        if self.config.cascade_demotion_eviction {
            self.trim_cold().await?;
        }
        Ok(())
    }

    /// Evict at most one entry from an over-capacity cold segment.
    async fn trim_cold(&self) -> Result<(), StorageError> {
        if self.cold.len().await? <= self.cold.capacity() {
            return Ok(());
        }
        if let Some(victim) = self.cold.oldest().await? {
            info!(key = %victim.key, "Evicting from cold segment");
            self.cold.remove(&victim.key).await?;
            metrics::record_eviction(SegmentId::Cold.as_str());
        }
        Ok(())
    }
}
