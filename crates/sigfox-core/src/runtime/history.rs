// crates/sigfox-core/src/runtime/history.rs
// ============================================================================
// Module: Sigfox History Tracker
// Description: Per-hop timing records appended to envelope history.
// Purpose: Stamp each hop with duration and queue latency at 0.1 s granularity.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! [`HistoryTracker::record_hop`] is a pure transform: it clones the envelope
//! and appends exactly one [`HopRecord`]. The tracker reads time from an
//! injected [`Clock`] so tests can pin `now()`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::Clock;
use crate::core::Envelope;
use crate::core::HopRecord;
use crate::core::tenths_of_seconds;

// ============================================================================
// SECTION: History Tracker
// ============================================================================

/// Appends hop timing records for one step function.
#[derive(Clone)]
pub struct HistoryTracker {
    /// Time source for hop end stamps.
    clock: Arc<dyn Clock>,
    /// Step function name recorded on every hop.
    function: String,
}

impl HistoryTracker {
    /// Creates a tracker for the named step function.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, function: impl Into<String>) -> Self {
        Self {
            clock,
            function: function.into(),
        }
    }

    /// Returns the step function name stamped on records.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Returns a copy of `envelope` with one appended hop record.
    ///
    /// `started_at` is the invocation start time in unix epoch milliseconds.
    /// Latency is measured from the previous hop's `end` and is `None` for
    /// the first hop. Timestamps come from the wire, so differences saturate
    /// instead of overflowing.
    #[must_use]
    pub fn record_hop(
        &self,
        envelope: &Envelope,
        started_at: i64,
        source: Option<&str>,
    ) -> Envelope {
        let end = self.clock.now_millis();
        let latency = envelope
            .last_hop()
            .map(|previous| tenths_of_seconds(started_at.saturating_sub(previous.end)));
        let mut stamped = envelope.clone();
        stamped.history.push(HopRecord {
            timestamp: started_at,
            end,
            duration: tenths_of_seconds(end.saturating_sub(started_at)),
            latency,
            source: source.map(str::to_string),
            function: self.function.clone(),
        });
        stamped
    }
}

impl std::fmt::Debug for HistoryTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryTracker").field("function", &self.function).finish_non_exhaustive()
    }
}
