//! # SLRU Cache
//!
//! A segmented-LRU cache policy engine on top of a shared key-value hash store
//! (Redis in production, an in-memory store for tests).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SlruEngine<V>                          │
//! │  • get / set / status / clear                               │
//! │  • Promotion cold → hot when frequency > threshold          │
//! │  • Reactive capacity enforcement (evict / demote oldest)    │
//! └─────────────────────────────────────────────────────────────┘
//!                │                               │
//!                ▼                               ▼
//! ┌──────────────────────────────┐ ┌──────────────────────────────┐
//! │  Cold segment (probation)    │ │  Hot segment (protected)     │
//! │  • HASH cold_cache           │ │  • HASH hot_cache            │
//! │  • ZSET cold_cache:order     │ │  • ZSET hot_cache:order      │
//! │  • capacity 3 (default)      │ │  • capacity 2 (default)      │
//! └──────────────────────────────┘ └──────────────────────────────┘
//!                │                               │
//!                └───────────────┬───────────────┘
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  HashStore (Redis / memory)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slru_cache::{SlruConfig, SlruEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SlruConfig {
//!         redis_url: Some("redis://localhost:6379".into()),
//!         ..Default::default()
//!     };
//!
//!     let engine: SlruEngine<serde_json::Value> =
//!         SlruEngine::connect(config).await.expect("Failed to connect");
//!
//!     engine.set("user:42", serde_json::json!({"name": "Alice"})).await.unwrap();
//!     if let Some(value) = engine.get("user:42").await.unwrap() {
//!         println!("Found: {}", value);
//!     }
//!
//!     let status = engine.status().await.unwrap();
//!     println!("{}", serde_json::to_string_pretty(&status).unwrap());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: The [`SlruEngine`] policy engine
//! - [`segment`]: Per-segment accessor with access-order index
//! - [`cache_entry`]: Stored [`CacheEntry`] and its JSON encoding
//! - [`status`]: [`CacheStatus`] snapshot
//! - [`storage`]: Backing stores (Redis, Memory)
//! - [`clock`]: Injectable time source

pub mod cache_entry;
pub mod clock;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod segment;
pub mod status;
pub mod storage;

pub use cache_entry::CacheEntry;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ClearScope, ConfigError, SegmentConfig, SlruConfig};
pub use engine::{SetOutcome, SlruEngine, StartupError};
pub use segment::{Segment, SegmentId};
pub use status::{CacheStatus, StatusItem, UNKNOWN_ACCESS_TIME};
pub use storage::memory::InMemoryHashStore;
pub use storage::redis::RedisHashStore;
pub use storage::traits::{HashStore, StorageError};
