//! Configuration for the SLRU engine.
//!
//! # Example
//!
//! ```
//! use slru_cache::{ClearScope, SlruConfig};
//!
//! // Defaults: cold holds 3, hot holds 2, promote after more than 1 access
//! let config = SlruConfig::default();
//! assert_eq!(config.cold.capacity, 3);
//! assert_eq!(config.hot.capacity, 2);
//! assert_eq!(config.promotion_threshold, 1);
//! assert_eq!(config.clear_scope, ClearScope::FlushAll);
//!
//! // Loaded from JSON, missing fields fall back to defaults
//! let config: SlruConfig = serde_json::from_str(r#"{
//!     "redis_url": "redis://localhost:6379",
//!     "hot": { "name": "hot_cache", "capacity": 100 },
//!     "clear_scope": "segments"
//! }"#).unwrap();
//! assert_eq!(config.hot.capacity, 100);
//! assert_eq!(config.cold.capacity, 3);
//! assert_eq!(config.clear_scope, ClearScope::Segments);
//! ```

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("cold and hot segments share the name '{0}'")]
    SharedSegmentName(String),
    #[error("segment '{0}' must have a capacity of at least 1")]
    ZeroCapacity(String),
}

/// What [`clear`](crate::SlruEngine::clear) removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearScope {
    /// Flush the whole backing store (`FLUSHDB`), including unrelated data.
    #[default]
    FlushAll,
    /// Delete only the two segment hashes and their order indexes.
    Segments,
}

/// Name and capacity of one segment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SegmentConfig {
    /// Hash name in the backing store
    pub name: String,
    /// Max entries kept after capacity enforcement
    pub capacity: u64,
}

/// Configuration for the SLRU engine.
///
/// All fields have defaults matching the classic two-tier demo layout.
#[derive(Debug, Clone, Deserialize)]
pub struct SlruConfig {
    /// Redis connection string (e.g., "redis://localhost:6379")
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Optional namespace prefix for every collection name
    #[serde(default)]
    pub redis_prefix: Option<String>,

    /// Probationary segment (default: `cold_cache`, capacity 3)
    #[serde(default = "default_cold")]
    pub cold: SegmentConfig,

    /// Protected segment (default: `hot_cache`, capacity 2)
    #[serde(default = "default_hot")]
    pub hot: SegmentConfig,

    /// A cold hit promotes once frequency exceeds this (default: 1)
    #[serde(default = "default_promotion_threshold")]
    pub promotion_threshold: u64,

    /// Scope of `clear()` (default: flush everything)
    #[serde(default)]
    pub clear_scope: ClearScope,

    /// Re-check cold capacity after a demotion in the same pass (default: false)
    #[serde(default)]
    pub cascade_demotion_eviction: bool,
}

fn default_cold() -> SegmentConfig {
    SegmentConfig { name: "cold_cache".to_string(), capacity: 3 }
}
fn default_hot() -> SegmentConfig {
    SegmentConfig { name: "hot_cache".to_string(), capacity: 2 }
}
fn default_promotion_threshold() -> u64 { 1 }

impl Default for SlruConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            redis_prefix: None,
            cold: default_cold(),
            hot: default_hot(),
            promotion_threshold: default_promotion_threshold(),
            clear_scope: ClearScope::default(),
            cascade_demotion_eviction: false,
        }
    }
}

impl SlruConfig {
    /// Reject configurations the engine cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cold.name == self.hot.name {
            return Err(ConfigError::SharedSegmentName(self.cold.name.clone()));
        }
        for segment in [&self.cold, &self.hot] {
            if segment.capacity == 0 {
                return Err(ConfigError::ZeroCapacity(segment.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_segment_config_is_rejected() {
        // A segment object must name both fields
        let result: Result<SlruConfig, _> = serde_json::from_str(r#"{"cold": {"capacity": 10}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config: SlruConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.cold, default_cold());
        assert_eq!(config.hot, default_hot());
        assert!(!config.cascade_demotion_eviction);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_shared_name() {
        let mut config = SlruConfig::default();
        config.hot.name = config.cold.name.clone();
        assert_eq!(
            config.validate(),
            Err(ConfigError::SharedSegmentName("cold_cache".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = SlruConfig::default();
        config.cold.capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity("cold_cache".to_string())));
    }
}
