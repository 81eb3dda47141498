// crates/sigfox-core/src/runtime/sink.rs
// ============================================================================
// Module: Sigfox In-Process Event Sinks
// Description: No-op and in-memory event sinks.
// Purpose: Provide dependency-free sinks for tests and quiet deployments.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`NoopEventSink`] drops every event. [`MemoryEventSink`] keeps events in
//! memory so tests can assert on the exact log trail of an invocation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use crate::core::PipelineEvent;
use crate::interfaces::EventSink;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Event sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: &PipelineEvent) {}
}

/// Event sink that keeps events in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryEventSink {
    /// Recorded events in arrival order.
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl MemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Returns the recorded event names in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events().iter().map(|event| event.event).collect()
    }
}

impl EventSink for MemoryEventSink {
    fn record(&self, event: &PipelineEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}
