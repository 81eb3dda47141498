// crates/sigfox-core/src/core/events.rs
// ============================================================================
// Module: Sigfox Pipeline Events
// Description: Structured log events emitted by pipeline components.
// Purpose: Give every hop a uniform, machine-readable log trail.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every observable side effect of the pipeline (task result, dispatch,
//! termination, swallowed error) is recorded as a [`PipelineEvent`]. The log
//! trail is the only failure signal the platform sees, since the entry point
//! never reports an error to its caller.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::DeviceId;
use crate::core::identifiers::TraceId;

// ============================================================================
// SECTION: Event Names
// ============================================================================

/// Invocation accepted and trigger decoded.
pub const EVENT_START: &str = "start";
/// Trigger payload could not be decoded.
pub const EVENT_DECODE_ERROR: &str = "decode_error";
/// Message was already processed; task and dispatch skipped.
pub const EVENT_DUPLICATE_SKIPPED: &str = "duplicate_skipped";
/// Duplicate check failed; message treated as unprocessed.
pub const EVENT_DEDUP_ERROR: &str = "dedup_error";
/// Step task completed.
pub const EVENT_TASK: &str = "task";
/// Step task failed; error swallowed.
pub const EVENT_TASK_ERROR: &str = "task_error";
/// Step task tried to replace a non-empty route; change ignored.
pub const EVENT_ROUTE_IGNORED: &str = "route_ignored";
/// Envelope published to the next step.
pub const EVENT_DISPATCH: &str = "dispatch";
/// Publishing to the next step failed; error swallowed.
pub const EVENT_DISPATCH_ERROR: &str = "dispatch_error";
/// Route exhausted; nothing published.
pub const EVENT_NO_ROUTE: &str = "no_route";
/// Envelope already dispatched; dispatch skipped.
pub const EVENT_SKIP_DISPATCHED: &str = "skip_dispatched";
/// Final invocation outcome.
pub const EVENT_RESULT: &str = "result";
/// Route resolved for a device.
pub const EVENT_ROUTE_LOOKUP: &str = "route_lookup";
/// Route source failed; stale route reused or lookup failed.
pub const EVENT_ROUTE_LOOKUP_ERROR: &str = "route_lookup_error";
/// Structured payload decoded into body fields.
pub const EVENT_DECODE_PAYLOAD: &str = "decode_payload";
/// Structured payload could not be decoded; body left unchanged.
pub const EVENT_DECODE_PAYLOAD_ERROR: &str = "decode_payload_error";
/// Callback message published to a fan-out topic.
pub const EVENT_CALLBACK_PUBLISH: &str = "callback_publish";
/// Callback fan-out publish failed; error swallowed.
pub const EVENT_CALLBACK_PUBLISH_ERROR: &str = "callback_publish_error";
/// Callback message rejected as too old.
pub const EVENT_CALLBACK_REJECTED: &str = "callback_rejected";

// ============================================================================
// SECTION: Event Payload
// ============================================================================

/// Structured pipeline log event.
///
/// # Invariants
/// - `event` is one of the stable event names or a step-defined action name.
/// - `fields` is a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineEvent {
    /// Event name.
    pub event: &'static str,
    /// Event timestamp (unix epoch milliseconds).
    pub timestamp_ms: i64,
    /// Step function emitting the event.
    pub function: String,
    /// Invocation identifier.
    pub invocation_id: String,
    /// Device the message belongs to, when known.
    pub device: Option<DeviceId>,
    /// Root trace identifier, when known.
    pub root_trace_id: Option<TraceId>,
    /// Event-specific fields.
    pub fields: Value,
}
