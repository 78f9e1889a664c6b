// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the SLRU engine.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding application chooses the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `slru_` prefix for all metrics
//! - `_total` suffix for counters
//!
//! # Labels
//! - `segment`: cold, hot
//! - `outcome`: admitted, already_present

use metrics::{counter, gauge};

/// Record a lookup that resolved to an entry in `segment`
pub fn record_hit(segment: &str) {
    counter!("slru_hits_total", "segment" => segment.to_string()).increment(1);
}

/// Record a lookup that missed both segments
pub fn record_miss() {
    counter!("slru_misses_total").increment(1);
}

/// Record the outcome of a `set`
pub fn record_set(outcome: &str) {
    counter!("slru_sets_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_promotion() {
    counter!("slru_promotions_total").increment(1);
}

pub fn record_demotion() {
    counter!("slru_demotions_total").increment(1);
}

/// Record an entry permanently dropped from `segment`
pub fn record_eviction(segment: &str) {
    counter!("slru_evictions_total", "segment" => segment.to_string()).increment(1);
}

/// Record a stored record that could not be decoded
pub fn record_decode_failure(segment: &str) {
    counter!("slru_decode_failures_total", "segment" => segment.to_string()).increment(1);
}

/// Set current entry count of a segment
pub fn set_segment_entries(segment: &str, count: u64) {
    gauge!("slru_segment_entries", "segment" => segment.to_string()).set(count as f64);
}

pub fn record_clear() {
    counter!("slru_clears_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        // No global recorder installed: calls must not panic
        record_hit("cold");
        record_miss();
        record_set("admitted");
        record_promotion();
        record_demotion();
        record_eviction("cold");
        record_decode_failure("hot");
        set_segment_entries("hot", 2);
        record_clear();
    }
}
