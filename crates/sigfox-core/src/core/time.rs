// crates/sigfox-core/src/core/time.rs
// ============================================================================
// Module: Sigfox Time Model
// Description: Clock abstraction and hop-timing granularity helpers.
// Purpose: Keep history computations deterministic under test.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Pipeline code never reads wall-clock time directly; it asks a [`Clock`].
//! Production wiring uses [`SystemClock`], tests use [`ManualClock`] to pin
//! `now()` and assert exact durations and latencies.
//!
//! Hop timings are reported in seconds at 0.1 s granularity: the millisecond
//! difference is truncated to whole 100 ms units before dividing by ten.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Source of the current time in unix epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current time in unix epoch milliseconds.
    fn now_millis(&self) -> i64;
}

/// Wall-clock time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
    }
}

/// Manually driven clock for tests and replays.
///
/// # Invariants
/// - Time only changes through [`ManualClock::set`] or [`ManualClock::advance`].
#[derive(Debug, Default)]
pub struct ManualClock {
    /// Current time in unix epoch milliseconds.
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a manual clock pinned at `start_millis`.
    #[must_use]
    pub const fn new(start_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(start_millis),
        }
    }

    /// Pins the clock at `millis`.
    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    /// Moves the clock forward by `delta_millis`.
    pub fn advance(&self, delta_millis: i64) {
        self.now.fetch_add(delta_millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Granularity
// ============================================================================

/// Converts a millisecond span into seconds at 0.1 s granularity.
///
/// The span is truncated toward zero to whole 100 ms units, so `350` yields
/// `0.3` and `1200` yields `1.2`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    reason = "Hop spans are far below 2^52 tenths of a second."
)]
pub fn tenths_of_seconds(span_millis: i64) -> f64 {
    let tenths = span_millis / 100;
    tenths as f64 / 10.0
}
