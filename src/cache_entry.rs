//! Cache entry data structure.
//!
//! A [`CacheEntry`] is what each segment stores per key. It is encoded as a
//! single JSON document and written as one hash field:
//!
//! ```json
//! {"key": "user:42", "value": {"name": "Alice"}, "lastAccessTime": 1767084657058, "frequency": 2}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use crate::storage::traits::StorageError;

/// A cached value plus its access metadata.
///
/// # Example
///
/// ```
/// use slru_cache::CacheEntry;
///
/// let mut entry = CacheEntry::new("user:42".to_string(), "Alice".to_string(), 1_000);
/// assert_eq!(entry.frequency, 0);
///
/// entry.accessed(2_000);
/// assert_eq!(entry.frequency, 1);
/// assert_eq!(entry.last_access_time, 2_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    pub key: String,
    /// Opaque payload. Fixed at admission.
    pub value: V,
    /// Epoch millis of admission or the latest access
    pub last_access_time: i64,
    /// Successful reads since admission
    pub frequency: u64,
}

impl<V> CacheEntry<V> {
    /// Fresh entry as created on admission.
    pub fn new(key: String, value: V, now: i64) -> Self {
        Self {
            key,
            value,
            last_access_time: now,
            frequency: 0,
        }
    }

    /// Record one access.
    pub fn accessed(&mut self, now: i64) {
        self.last_access_time = now;
        self.frequency = self.frequency.saturating_add(1);
    }
}

impl<V: Serialize> CacheEntry<V> {
    pub fn encode(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

impl<V: DeserializeOwned> CacheEntry<V> {
    pub fn decode(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}
