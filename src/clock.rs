// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Time source for entry access timestamps.
//!
//! Timestamps are epoch milliseconds. The engine never reads the wall clock
//! directly, so tests can drive time with [`ManualClock`].

use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

/// Deterministic clock. Each read returns the current value and then moves
/// it forward by `step` millis, so successive events get distinct times.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicI64,
    step: i64,
}

impl ManualClock {
    /// A clock that only moves when told to.
    #[must_use]
    pub fn frozen(start: i64) -> Self {
        Self { now: AtomicI64::new(start), step: 0 }
    }

    /// A clock that ticks `step` millis on every read.
    #[must_use]
    pub fn ticking(start: i64, step: i64) -> Self {
        Self { now: AtomicI64::new(start), step }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    /// Current value without ticking.
    #[must_use]
    pub fn peek(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.fetch_add(self.step, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_frozen_clock_only_moves_on_advance() {
        let clock = ManualClock::frozen(100);
        assert_eq!(clock.now_millis(), 100);
        assert_eq!(clock.now_millis(), 100);

        clock.advance(5);
        assert_eq!(clock.now_millis(), 105);

        clock.set(1);
        assert_eq!(clock.peek(), 1);
    }

    #[test]
    fn test_ticking_clock_returns_then_steps() {
        let clock = ManualClock::ticking(0, 10);
        assert_eq!(clock.now_millis(), 0);
        assert_eq!(clock.now_millis(), 10);
        assert_eq!(clock.peek(), 20);
    }
}
