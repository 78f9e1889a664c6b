//! Snapshot of both segments, as returned by [`SlruEngine::status`](crate::SlruEngine::status).

use serde::{Deserialize, Serialize};
use crate::cache_entry::CacheEntry;

/// Access time reported for records that could not be decoded.
pub const UNKNOWN_ACCESS_TIME: i64 = i64::MIN;

/// One key's metadata in a status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusItem {
    pub key: String,
    pub last_access_time: i64,
    pub frequency: u64,
}

impl StatusItem {
    /// Project a listed key and its (possibly undecodable) entry.
    pub fn project<V>(key: String, entry: Option<&CacheEntry<V>>) -> Self {
        match entry {
            Some(entry) => Self {
                key,
                last_access_time: entry.last_access_time,
                frequency: entry.frequency,
            },
            None => Self {
                key,
                last_access_time: UNKNOWN_ACCESS_TIME,
                frequency: 0,
            },
        }
    }
}

/// Keys of both segments, each list ascending by `lastAccessTime`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub cold_cache_keys: Vec<StatusItem>,
    pub hot_cache_keys: Vec<StatusItem>,
}

impl CacheStatus {
    /// Build a snapshot from enumerated segment contents. Pure; the inputs
    /// may be in any order.
    pub fn from_entries<V>(
        cold: Vec<(String, Option<CacheEntry<V>>)>,
        hot: Vec<(String, Option<CacheEntry<V>>)>,
    ) -> Self {
        Self {
            cold_cache_keys: sorted_items(cold),
            hot_cache_keys: sorted_items(hot),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cold_cache_keys.is_empty() && self.hot_cache_keys.is_empty()
    }

    pub fn cold_keys(&self) -> impl Iterator<Item = &str> {
        self.cold_cache_keys.iter().map(|item| item.key.as_str())
    }

    pub fn hot_keys(&self) -> impl Iterator<Item = &str> {
        self.hot_cache_keys.iter().map(|item| item.key.as_str())
    }
}

fn sorted_items<V>(entries: Vec<(String, Option<CacheEntry<V>>)>) -> Vec<StatusItem> {
    let mut items: Vec<StatusItem> = entries
        .into_iter()
        .map(|(key, entry)| StatusItem::project(key, entry.as_ref()))
        .collect();
    // Stable: equal times keep enumeration order
    items.sort_by_key(|item| item.last_access_time);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listed(key: &str, time: i64, frequency: u64) -> (String, Option<CacheEntry<()>>) {
        let mut entry = CacheEntry::new(key.to_string(), (), time);
        entry.frequency = frequency;
        (key.to_string(), Some(entry))
    }

    #[test]
    fn test_lists_sorted_by_access_time() {
        let status = CacheStatus::from_entries(
            vec![listed("c", 30, 0), listed("a", 10, 1), listed("b", 20, 0)],
            vec![listed("y", 50, 3), listed("x", 40, 2)],
        );

        assert_eq!(status.cold_keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(status.hot_keys().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(status.cold_cache_keys[0].frequency, 1);
    }

    #[test]
    fn test_undecodable_entries_reported_with_sentinel() {
        let status = CacheStatus::from_entries(
            vec![listed("ok", 5, 4), ("broken".to_string(), None)],
            Vec::new(),
        );

        assert_eq!(
            status.cold_cache_keys[0],
            StatusItem { key: "broken".to_string(), last_access_time: UNKNOWN_ACCESS_TIME, frequency: 0 }
        );
        assert_eq!(status.cold_cache_keys[1].key, "ok");
    }

    #[test]
    fn test_empty_snapshot() {
        let status = CacheStatus::from_entries::<()>(Vec::new(), Vec::new());
        assert!(status.is_empty());
        assert_eq!(status, CacheStatus::default());
    }

    #[test]
    fn test_serializes_with_camel_case_lists() {
        let status = CacheStatus::from_entries(vec![listed("a", 1, 2)], Vec::new());
        let doc = serde_json::to_value(&status).unwrap();

        assert_eq!(
            doc,
            json!({
                "coldCacheKeys": [{"key": "a", "lastAccessTime": 1, "frequency": 2}],
                "hotCacheKeys": []
            })
        );
    }
}
