// crates/sigfox-core/src/runtime/context.rs
// ============================================================================
// Module: Sigfox Request Context
// Description: Per-invocation context shared by task runner and dispatcher.
// Purpose: Carry invocation identity, timing, and the event sink for one hop.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! A [`RequestContext`] is built when an invocation starts and consumed by
//! [`RequestContext::finish`] when it ends. It stamps every [`PipelineEvent`]
//! with the function name, invocation id, and the device and trace bound from
//! the decoded envelope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::core::Clock;
use crate::core::DeviceId;
use crate::core::Envelope;
use crate::core::PipelineEvent;
use crate::core::TraceId;
use crate::interfaces::EventSink;
use crate::interfaces::EventSinkError;

// ============================================================================
// SECTION: Request Context
// ============================================================================

/// Context for one step invocation.
///
/// # Invariants
/// - `started_at` is read from the clock once, at construction.
#[derive(Clone)]
pub struct RequestContext {
    /// Step function handling the invocation.
    function: String,
    /// Invocation identifier.
    invocation_id: String,
    /// Invocation start time (unix epoch milliseconds).
    started_at: i64,
    /// Queue topic or request path that delivered the trigger.
    source: Option<String>,
    /// Device bound from the decoded envelope.
    device: Option<DeviceId>,
    /// Root trace bound from the decoded envelope.
    root_trace_id: Option<TraceId>,
    /// Event sink receiving structured events.
    events: Arc<dyn EventSink>,
    /// Shared time source.
    clock: Arc<dyn Clock>,
}

impl RequestContext {
    /// Starts a context for `function`, reading the start time from `clock`.
    #[must_use]
    pub fn new(
        function: impl Into<String>,
        invocation_id: impl Into<String>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let started_at = clock.now_millis();
        Self {
            function: function.into(),
            invocation_id: invocation_id.into(),
            started_at,
            source: None,
            device: None,
            root_trace_id: None,
            events,
            clock,
        }
    }

    /// Sets the trigger source.
    #[must_use]
    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    /// Binds device and trace identity from a decoded envelope.
    pub fn bind(&mut self, envelope: &Envelope) {
        self.device.clone_from(&envelope.device);
        self.root_trace_id.clone_from(&envelope.root_trace_id);
    }

    /// Returns the step function name.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Returns the invocation identifier.
    #[must_use]
    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    /// Returns the invocation start time.
    #[must_use]
    pub const fn started_at(&self) -> i64 {
        self.started_at
    }

    /// Returns the trigger source, if known.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns the bound device, if any.
    #[must_use]
    pub const fn device(&self) -> Option<&DeviceId> {
        self.device.as_ref()
    }

    /// Returns the shared clock.
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Records a structured event with the given fields.
    pub fn log(&self, event: &'static str, fields: Value) {
        self.events.record(&PipelineEvent {
            event,
            timestamp_ms: self.clock.now_millis(),
            function: self.function.clone(),
            invocation_id: self.invocation_id.clone(),
            device: self.device.clone(),
            root_trace_id: self.root_trace_id.clone(),
            fields,
        });
    }

    /// Ends the invocation, flushing the event sink.
    ///
    /// # Errors
    ///
    /// Returns [`EventSinkError`] when the sink cannot flush.
    pub async fn finish(self) -> Result<(), EventSinkError> {
        self.events.flush().await
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("function", &self.function)
            .field("invocation_id", &self.invocation_id)
            .field("started_at", &self.started_at)
            .field("source", &self.source)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}
