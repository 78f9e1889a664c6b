//! Backing stores for the cache segments.

pub mod traits;
pub mod memory;
pub mod redis;
