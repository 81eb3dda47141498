// crates/sigfox-runtime/tests/common/mod.rs
// ============================================================================
// Module: Common Test Utilities
// Description: Shared fixtures for sigfox-runtime tests.
// Purpose: Provide recording publishers, scripted tasks, and contexts.
// Dependencies: sigfox-broker, sigfox-core, serde_json
// ============================================================================

//! ## Overview
//! Provides shared helpers for dispatcher, runner, handler, and ingest tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use sigfox_broker::CallbackPublisher;
use sigfox_core::Clock;
use sigfox_core::DeviceId;
use sigfox_core::Envelope;
use sigfox_core::ManualClock;
use sigfox_core::MemoryEventSink;
use sigfox_core::PublishError;
use sigfox_core::PublishReceipt;
use sigfox_core::RequestContext;
use sigfox_core::Route;
use sigfox_core::StepTask;
use sigfox_core::TaskError;
use sigfox_core::TopicName;

/// Fixed invocation start for deterministic hop records.
pub const START: i64 = 1_494_167_452_454;

// ============================================================================
// SECTION: Envelopes
// ============================================================================

/// Creates the reference envelope: device `1C8A7E`, route `[decode, log]`.
pub fn routed_envelope() -> Envelope {
    let body = json!({"uuid": "ab0d40bd-dbc5-4076-b684-3f610d96e621", "data": "920e06272731741db051e600"});
    let mut envelope = Envelope::new(Some(DeviceId::new("1C8A7E")), body.as_object().cloned().unwrap());
    envelope.route = Route::new(["decode", "log"]);
    envelope
}

// ============================================================================
// SECTION: Recording Publisher
// ============================================================================

/// Publishes recorded as `(topic, payload)` pairs.
pub type Published = Arc<Mutex<Vec<(TopicName, Value)>>>;

/// Builds a publisher that records every publish and fails topics in `failing`.
pub fn recording_publisher(failing: &[&str]) -> (Arc<CallbackPublisher>, Published) {
    let published: Published = Arc::new(Mutex::new(Vec::new()));
    let failing: Vec<String> = failing.iter().map(ToString::to_string).collect();
    let sink = Arc::clone(&published);
    let publisher = CallbackPublisher::new(move |topic, payload| {
        let mut guard = sink.lock().unwrap();
        guard.push((topic.clone(), payload.clone()));
        if failing.iter().any(|name| name == topic.as_str()) {
            return Err(PublishError::Delivery(format!("rejected {topic}")));
        }
        Ok(PublishReceipt {
            message_id: format!("msg-{}", guard.len()),
            topic: topic.clone(),
        })
    });
    (Arc::new(publisher), published)
}

/// Returns the recorded topic names in publish order.
pub fn topics(published: &Published) -> Vec<String> {
    published.lock().unwrap().iter().map(|(topic, _)| topic.to_string()).collect()
}

// ============================================================================
// SECTION: Contexts
// ============================================================================

/// Builds a context for `function` on a manual clock reading `now`.
pub fn context(function: &str, now: i64) -> (RequestContext, MemoryEventSink, Arc<ManualClock>) {
    let events = MemoryEventSink::new();
    let clock = Arc::new(ManualClock::new(now));
    let ctx = RequestContext::new(function, "inv-1", Arc::new(events.clone()), Arc::clone(&clock) as Arc<dyn Clock>);
    (ctx, events, clock)
}

// ============================================================================
// SECTION: Scripted Tasks
// ============================================================================

/// Task behaviour scripted per test.
pub enum ScriptedTask {
    /// Returns the envelope unchanged.
    Noop,
    /// Inserts a body field and returns the envelope.
    SetBody(&'static str, Value),
    /// Replaces the route with the given steps.
    SetRoute(Vec<&'static str>),
    /// Fails with the given message.
    Fail(&'static str),
}

#[async_trait]
impl StepTask for ScriptedTask {
    async fn run(
        &self,
        _ctx: &RequestContext,
        _device: Option<&DeviceId>,
        body: &Map<String, Value>,
        envelope: &Envelope,
    ) -> Result<Envelope, TaskError> {
        let mut updated = envelope.clone();
        match self {
            Self::Noop => {}
            Self::SetBody(key, value) => {
                let mut body = body.clone();
                body.insert((*key).to_string(), value.clone());
                updated.body = body;
            }
            Self::SetRoute(steps) => {
                updated.route = Route::new(steps.iter().copied());
            }
            Self::Fail(message) => return Err(TaskError::Failed((*message).to_string())),
        }
        Ok(updated)
    }
}
