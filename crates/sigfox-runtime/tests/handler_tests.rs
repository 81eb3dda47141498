// crates/sigfox-runtime/tests/handler_tests.rs
// ============================================================================
// Module: Step Handler Tests
// Description: End-to-end tests for one step invocation.
// Purpose: Pin the invocation state machine and its failure recovery.
// Dependencies: sigfox-runtime, sigfox-core, sigfox-broker, base64, tokio
// ============================================================================

//! ## Overview
//! Drives [`sigfox_runtime::StepHandler::handle`] from raw trigger bytes.

#![allow(dead_code, reason = "Common module may have unused helpers.")]
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

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use sigfox_broker::HttpTriggerDecoder;
use sigfox_broker::JsonLinesEventSink;
use sigfox_broker::QueueTriggerDecoder;
use sigfox_core::DedupCheck;
use sigfox_core::DedupError;
use sigfox_core::Envelope;
use sigfox_core::EventSink;
use sigfox_core::EventSinkError;
use sigfox_core::ManualClock;
use sigfox_core::MemoryEventSink;
use sigfox_core::PipelineError;
use sigfox_core::PipelineEvent;
use sigfox_core::RequestContext;
use sigfox_core::Route;
use sigfox_core::StepName;
use sigfox_core::events::EVENT_DECODE_ERROR;
use sigfox_core::events::EVENT_DEDUP_ERROR;
use sigfox_core::events::EVENT_DISPATCH;
use sigfox_core::events::EVENT_DUPLICATE_SKIPPED;
use sigfox_core::events::EVENT_RESULT;
use sigfox_core::events::EVENT_START;
use sigfox_core::events::EVENT_TASK;
use sigfox_runtime::FlushStatus;
use sigfox_runtime::HandlerError;
use sigfox_runtime::InMemorySeenStore;
use sigfox_runtime::InvocationState;
use sigfox_runtime::RecentMessageFilter;
use sigfox_runtime::StepHandler;
use sigfox_runtime::StepHandlerBuilder;

use crate::common::Published;
use crate::common::START;
use crate::common::ScriptedTask;
use crate::common::recording_publisher;
use crate::common::routed_envelope;
use crate::common::topics;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Event sink whose flush never completes in time.
struct SlowSink;

#[async_trait]
impl EventSink for SlowSink {
    fn record(&self, _event: &PipelineEvent) {}

    async fn flush(&self) -> Result<(), EventSinkError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
}

/// Event sink whose flush always fails.
struct BrokenSink;

#[async_trait]
impl EventSink for BrokenSink {
    fn record(&self, _event: &PipelineEvent) {}

    async fn flush(&self) -> Result<(), EventSinkError> {
        Err(EventSinkError::Write("log endpoint offline".to_string()))
    }
}

/// Writer that blocks until its gate sender is dropped.
struct GatedWriter {
    /// Released when the test drops the sender.
    gate: std::sync::mpsc::Receiver<()>,
}

impl std::io::Write for GatedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let _ = self.gate.recv();
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Duplicate check whose store is unavailable.
struct BrokenDedup;

#[async_trait]
impl DedupCheck for BrokenDedup {
    async fn is_processed_message(
        &self,
        _ctx: &RequestContext,
        _envelope: &Envelope,
    ) -> Result<bool, DedupError> {
        Err(DedupError::Store("store offline".to_string()))
    }

    async fn mark_processed(
        &self,
        _ctx: &RequestContext,
        _envelope: &Envelope,
    ) -> Result<(), DedupError> {
        Ok(())
    }
}

/// Returns a builder for an HTTP-triggered no-op step.
fn builder(function: &str) -> (StepHandlerBuilder, Published) {
    let (publisher, published) = recording_publisher(&[]);
    let builder = StepHandlerBuilder::new(function)
        .decoder(Arc::new(HttpTriggerDecoder::new(Some("/decode".to_string()))))
        .task(Arc::new(ScriptedTask::Noop))
        .publisher(publisher)
        .clock(Arc::new(ManualClock::new(START)));
    (builder, published)
}

/// Encodes the reference envelope as an HTTP trigger body.
fn http_trigger() -> Vec<u8> {
    serde_json::to_vec(&routed_envelope()).unwrap()
}

/// Builds a handler with an in-memory event sink.
fn handler_with_events(function: &str) -> (StepHandler, MemoryEventSink, Published) {
    let events = MemoryEventSink::new();
    let (builder, published) = builder(function);
    let handler = builder.events(Arc::new(events.clone())).build().unwrap();
    (handler, events, published)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies the reference message is dispatched to its first step.
#[tokio::test]
async fn end_to_end_dispatches_reference_message() {
    let (handler, events, published) = handler_with_events("routeMessage");

    let report = handler.handle(&http_trigger()).await;
    assert_eq!(report.state, InvocationState::Flushed);
    assert_eq!(report.flush, FlushStatus::Flushed);
    assert!(!report.duplicate);
    assert!(report.errors.is_empty());

    let envelope = report.envelope.expect("envelope");
    assert_eq!(envelope.step, Some(StepName::new("decode")));
    assert_eq!(envelope.route, Route::new(["log"]));
    assert_eq!(envelope.history.len(), 1);
    assert_eq!(envelope.history[0].source.as_deref(), Some("/decode"));
    assert_eq!(envelope.history[0].function, "routeMessage");

    assert_eq!(topics(&published), vec!["sigfox.types.decode"]);
    assert_eq!(events.event_names(), vec![EVENT_START, EVENT_TASK, EVENT_DISPATCH, EVENT_RESULT]);
    assert!(events.events().iter().all(|event| event.invocation_id == report.invocation_id));
    assert!(events.events().iter().all(|event| event.device.as_ref().map(|d| d.as_str()) == Some("1C8A7E")));
}

/// Verifies a queue trigger records its topic as the hop source.
#[tokio::test]
async fn queue_trigger_records_topic_source() {
    let (publisher, published) = recording_publisher(&[]);
    let handler = StepHandlerBuilder::new("decode")
        .decoder(Arc::new(QueueTriggerDecoder::new()))
        .task(Arc::new(ScriptedTask::Noop))
        .publisher(publisher)
        .build()
        .unwrap();
    let data = STANDARD.encode(serde_json::to_vec(&routed_envelope()).unwrap());
    let event = json!({
        "resource": "projects/myproject/topics/sigfox.types.decode",
        "eventId": "121025758478243",
        "data": {"attributes": {}, "data": data},
    });

    let report = handler.handle(event.to_string().as_bytes()).await;
    let envelope = report.envelope.expect("envelope");
    assert_eq!(
        envelope.history[0].source.as_deref(),
        Some("projects/myproject/topics/sigfox.types.decode")
    );
    assert_eq!(topics(&published), vec!["sigfox.types.decode"]);
}

/// Verifies an undecodable trigger produces a report without an envelope.
#[tokio::test]
async fn decode_failure_is_reported() {
    let (handler, events, published) = handler_with_events("decode");

    let report = handler.handle(b"not json").await;
    assert!(report.envelope.is_none());
    assert_eq!(report.state, InvocationState::Received);
    assert!(matches!(report.errors.as_slice(), [PipelineError::Decode(_)]));
    assert!(published.lock().unwrap().is_empty());
    assert_eq!(events.event_names(), vec![EVENT_DECODE_ERROR]);
}

/// Verifies a redelivered message is skipped by the recent-message filter.
#[tokio::test]
async fn duplicate_delivery_is_skipped() {
    let clock = Arc::new(ManualClock::new(START));
    let store = InMemorySeenStore::new(Arc::clone(&clock) as _);
    let events = MemoryEventSink::new();
    let (builder, published) = builder("decode");
    let handler = builder
        .dedup(Arc::new(RecentMessageFilter::new(store)))
        .events(Arc::new(events.clone()))
        .build()
        .unwrap();

    let first = handler.handle(&http_trigger()).await;
    let second = handler.handle(&http_trigger()).await;

    assert!(!first.duplicate);
    assert!(second.duplicate);
    assert_eq!(second.envelope.expect("envelope").history.len(), 0);
    assert_eq!(published.lock().unwrap().len(), 1);
    assert!(events.event_names().contains(&EVENT_DUPLICATE_SKIPPED));
}

/// Verifies a dedup failure is treated as not processed.
#[tokio::test]
async fn dedup_failure_still_dispatches() {
    let events = MemoryEventSink::new();
    let (builder, published) = builder("decode");
    let handler =
        builder.dedup(Arc::new(BrokenDedup)).events(Arc::new(events.clone())).build().unwrap();

    let report = handler.handle(&http_trigger()).await;
    assert!(matches!(report.errors.as_slice(), [PipelineError::Dedup(_)]));
    assert_eq!(published.lock().unwrap().len(), 1);
    assert_eq!(events.event_names()[1], EVENT_DEDUP_ERROR);
}

/// Verifies a slow flush is abandoned after the timeout.
#[tokio::test]
async fn slow_flush_times_out() {
    let (builder, published) = builder("decode");
    let handler = builder
        .events(Arc::new(SlowSink))
        .flush_timeout(Duration::from_millis(20))
        .build()
        .unwrap();

    let report = handler.handle(&http_trigger()).await;
    assert_eq!(report.flush, FlushStatus::TimedOut);
    assert_eq!(report.state, InvocationState::Dispatched);
    assert_eq!(published.lock().unwrap().len(), 1);
}

/// Verifies a stalled JSON-lines writer cannot hold the invocation past the timeout.
#[tokio::test(flavor = "multi_thread")]
async fn stalled_json_lines_writer_times_out() {
    let (release, gate) = std::sync::mpsc::channel::<()>();
    let (builder, published) = builder("decode");
    let handler = builder
        .events(Arc::new(JsonLinesEventSink::new(GatedWriter { gate })))
        .flush_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    let started = std::time::Instant::now();
    let report = handler.handle(&http_trigger()).await;
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.flush, FlushStatus::TimedOut);
    assert_eq!(report.state, InvocationState::Dispatched);
    assert_eq!(published.lock().unwrap().len(), 1);
    drop(release);
}

/// Verifies a failing flush is reported, not raised.
#[tokio::test]
async fn failed_flush_is_reported() {
    let (builder, _published) = builder("decode");
    let handler = builder.events(Arc::new(BrokenSink)).build().unwrap();

    let report = handler.handle(&http_trigger()).await;
    assert!(matches!(report.flush, FlushStatus::Failed(_)));
    assert_eq!(report.to_json()["flush"]["failed"], json!("event sink write failed: log endpoint offline"));
}

/// Verifies the report renders as JSON for operators.
#[tokio::test]
async fn report_renders_json() {
    let (handler, _events, _published) = handler_with_events("decode");
    let report = handler.handle(&http_trigger()).await;
    let rendered = report.to_json();
    assert_eq!(rendered["state"], json!("flushed"));
    assert_eq!(rendered["envelope"]["type"], json!("decode"));
    assert_eq!(rendered["errors"], json!([]));
}

/// Verifies the builder rejects missing collaborators.
#[test]
fn builder_requires_collaborators() {
    let err = StepHandlerBuilder::new("decode").build().unwrap_err();
    assert_eq!(err, HandlerError::MissingDecoder);
    let err = StepHandlerBuilder::new("decode")
        .decoder(Arc::new(QueueTriggerDecoder::new()))
        .build()
        .unwrap_err();
    assert_eq!(err, HandlerError::MissingTask);
    let err = StepHandlerBuilder::new("decode")
        .decoder(Arc::new(QueueTriggerDecoder::new()))
        .task(Arc::new(ScriptedTask::Noop))
        .build()
        .unwrap_err();
    assert_eq!(err, HandlerError::MissingPublisher);
}

/// Verifies a failed task and a failed publish both reach the report.
#[tokio::test]
async fn task_and_publish_failures_hold_state_at_task_run() {
    let (publisher, published) = recording_publisher(&["sigfox.types.decode"]);
    let handler = StepHandlerBuilder::new("decode")
        .decoder(Arc::new(HttpTriggerDecoder::new(None)))
        .task(Arc::new(ScriptedTask::Fail("boom")))
        .publisher(publisher)
        .clock(Arc::new(ManualClock::new(START)))
        .build()
        .unwrap();

    let report = handler.handle(&http_trigger()).await;
    assert_eq!(report.flush, FlushStatus::Flushed);
    assert_eq!(report.state, InvocationState::TaskRun);
    assert!(matches!(
        report.errors.as_slice(),
        [PipelineError::Task(_), PipelineError::Publish(_)]
    ));
    assert_eq!(published.lock().unwrap().len(), 1);
    let kinds: Vec<_> = report.to_json()["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|error| error["kind"].clone())
        .collect();
    assert_eq!(kinds, vec![json!("task"), json!("publish")]);
}

/// Verifies hostile hop timestamps in a queue trigger still yield a report.
#[tokio::test]
async fn extreme_hop_timestamps_do_not_abort_invocation() {
    let (publisher, published) = recording_publisher(&[]);
    let handler = StepHandlerBuilder::new("decode")
        .decoder(Arc::new(QueueTriggerDecoder::new()))
        .task(Arc::new(ScriptedTask::Noop))
        .publisher(publisher)
        .clock(Arc::new(ManualClock::new(START)))
        .build()
        .unwrap();
    let mut envelope = serde_json::to_value(routed_envelope()).unwrap();
    envelope["history"] = json!([{
        "timestamp": 0,
        "end": i64::MIN,
        "duration": 0.0,
        "latency": null,
        "source": null,
        "function": "sigfoxCallback",
    }]);
    let data = STANDARD.encode(serde_json::to_vec(&envelope).unwrap());
    let event = json!({
        "resource": "projects/myproject/topics/sigfox.types.decode",
        "eventId": "121025758478244",
        "data": {"attributes": {}, "data": data},
    });

    let report = handler.handle(event.to_string().as_bytes()).await;
    assert_eq!(report.state, InvocationState::Flushed);
    assert!(report.errors.is_empty());
    let sent = report.envelope.expect("envelope");
    assert_eq!(sent.history.len(), 2);
    assert!(sent.history[1].latency.is_some_and(f64::is_finite));
    assert_eq!(topics(&published), vec!["sigfox.types.decode"]);
}
