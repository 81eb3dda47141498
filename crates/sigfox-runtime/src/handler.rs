// crates/sigfox-runtime/src/handler.rs
// ============================================================================
// Module: Sigfox Step Handler
// Description: Entry point for one queue- or HTTP-triggered step invocation.
// Purpose: Drive decode, dedup, task, dispatch, and flush without ever failing.
// Dependencies: sigfox-core, serde_json, tokio, uuid
// ============================================================================

//! ## Overview
//! [`StepHandler::handle`] turns raw trigger bytes into an
//! [`InvocationReport`]. The invocation walks
//! `Received → Decoded → DedupChecked → TaskRun → Dispatched → Flushed`, and
//! every failure along the way is logged and collected instead of returned.
//! Invariants:
//! - `handle` never returns an error and never panics on bad input.
//! - The event sink is flushed exactly once per invocation, bounded by the
//!   configured flush timeout.
//! - A duplicate message skips the task runner and dispatcher.
//! - A failed publish holds the report at `TaskRun` even after a flush.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use sigfox_core::Clock;
use sigfox_core::DedupCheck;
use sigfox_core::Envelope;
use sigfox_core::EventSink;
use sigfox_core::HistoryTracker;
use sigfox_core::NeverProcessed;
use sigfox_core::NoopEventSink;
use sigfox_core::PipelineError;
use sigfox_core::Publisher;
use sigfox_core::RequestContext;
use sigfox_core::StepTask;
use sigfox_core::SystemClock;
use sigfox_core::TriggerDecoder;
use sigfox_core::events::EVENT_DECODE_ERROR;
use sigfox_core::events::EVENT_DEDUP_ERROR;
use sigfox_core::events::EVENT_DUPLICATE_SKIPPED;
use sigfox_core::events::EVENT_RESULT;
use sigfox_core::events::EVENT_START;
use thiserror::Error;
use uuid::Uuid;

use crate::dispatcher::Dispatcher;
use crate::runner::TaskRunner;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default upper bound on the end-of-invocation event flush.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_millis(2000);

// ============================================================================
// SECTION: Invocation Report
// ============================================================================

/// Furthest point an invocation reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InvocationState {
    /// Trigger received; decoding failed.
    Received,
    /// Trigger decoded into an envelope.
    Decoded,
    /// Duplicate check completed.
    DedupChecked,
    /// Step task ran but the hop never reached the queue.
    ///
    /// Reported when the publish to the next step failed.
    TaskRun,
    /// Dispatcher completed (published or terminated).
    Dispatched,
    /// Event sink flushed.
    Flushed,
}

impl InvocationState {
    /// Returns the stable state label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Decoded => "decoded",
            Self::DedupChecked => "dedup_checked",
            Self::TaskRun => "task_run",
            Self::Dispatched => "dispatched",
            Self::Flushed => "flushed",
        }
    }
}

/// Result of the end-of-invocation flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushStatus {
    /// Sink flushed within the timeout.
    Flushed,
    /// Sink reported an error.
    Failed(String),
    /// Flush did not complete within the timeout.
    TimedOut,
}

/// Summary of one step invocation.
#[derive(Debug)]
pub struct InvocationReport {
    /// Invocation identifier.
    pub invocation_id: String,
    /// Final envelope, absent when decoding failed.
    pub envelope: Option<Envelope>,
    /// Furthest state reached.
    pub state: InvocationState,
    /// True when the message was skipped as already processed.
    pub duplicate: bool,
    /// Errors recovered during the invocation.
    pub errors: Vec<PipelineError>,
    /// Outcome of the event flush.
    pub flush: FlushStatus,
}

impl InvocationReport {
    /// Renders the report as JSON for operator output.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let errors: Vec<Value> = self
            .errors
            .iter()
            .map(|err| json!({ "kind": err.kind(), "message": err.to_string() }))
            .collect();
        let flush = match &self.flush {
            FlushStatus::Flushed => json!("flushed"),
            FlushStatus::Failed(message) => json!({ "failed": message }),
            FlushStatus::TimedOut => json!("timed_out"),
        };
        json!({
            "invocationId": self.invocation_id,
            "state": self.state.as_str(),
            "duplicate": self.duplicate,
            "envelope": self.envelope,
            "errors": errors,
            "flush": flush,
        })
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Step handler construction errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// No trigger decoder was supplied.
    #[error("step handler requires a trigger decoder")]
    MissingDecoder,
    /// No step task was supplied.
    #[error("step handler requires a step task")]
    MissingTask,
    /// No publisher was supplied.
    #[error("step handler requires a publisher")]
    MissingPublisher,
}

/// Builder for [`StepHandler`].
pub struct StepHandlerBuilder {
    /// Step function name.
    function: String,
    /// Trigger decoder.
    decoder: Option<Arc<dyn TriggerDecoder>>,
    /// Step business logic.
    task: Option<Arc<dyn StepTask>>,
    /// Queue transport.
    publisher: Option<Arc<dyn Publisher>>,
    /// Duplicate check, defaulting to [`NeverProcessed`].
    dedup: Arc<dyn DedupCheck>,
    /// Event sink, defaulting to [`NoopEventSink`].
    events: Arc<dyn EventSink>,
    /// Time source, defaulting to [`SystemClock`].
    clock: Arc<dyn Clock>,
    /// Upper bound on the event flush.
    flush_timeout: Duration,
    /// Promote body fields on published payloads.
    unpack_body: bool,
}

impl StepHandlerBuilder {
    /// Starts a builder for the step function `function`.
    #[must_use]
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            decoder: None,
            task: None,
            publisher: None,
            dedup: Arc::new(NeverProcessed),
            events: Arc::new(NoopEventSink),
            clock: Arc::new(SystemClock),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            unpack_body: false,
        }
    }

    /// Sets the trigger decoder.
    #[must_use]
    pub fn decoder(mut self, decoder: Arc<dyn TriggerDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Sets the step task.
    #[must_use]
    pub fn task(mut self, task: Arc<dyn StepTask>) -> Self {
        self.task = Some(task);
        self
    }

    /// Sets the publisher.
    #[must_use]
    pub fn publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Sets the duplicate check.
    #[must_use]
    pub fn dedup(mut self, dedup: Arc<dyn DedupCheck>) -> Self {
        self.dedup = dedup;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Sets the clock.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the flush timeout.
    #[must_use]
    pub const fn flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    /// Enables body unpacking on published payloads.
    #[must_use]
    pub const fn unpack_body(mut self, unpack_body: bool) -> Self {
        self.unpack_body = unpack_body;
        self
    }

    /// Builds the handler.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when a required collaborator is missing.
    pub fn build(self) -> Result<StepHandler, HandlerError> {
        let decoder = self.decoder.ok_or(HandlerError::MissingDecoder)?;
        let task = self.task.ok_or(HandlerError::MissingTask)?;
        let publisher = self.publisher.ok_or(HandlerError::MissingPublisher)?;
        let history = HistoryTracker::new(Arc::clone(&self.clock), self.function.clone());
        let dispatcher =
            Dispatcher::new(publisher, history).with_unpack_body(self.unpack_body);
        Ok(StepHandler {
            function: self.function,
            decoder,
            runner: TaskRunner::new(task, dispatcher),
            dedup: self.dedup,
            events: self.events,
            clock: self.clock,
            flush_timeout: self.flush_timeout,
        })
    }
}

impl std::fmt::Debug for StepHandlerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepHandlerBuilder")
            .field("function", &self.function)
            .field("flush_timeout", &self.flush_timeout)
            .field("unpack_body", &self.unpack_body)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Step Handler
// ============================================================================

/// Infallible entry point for one pipeline step.
pub struct StepHandler {
    /// Step function name.
    function: String,
    /// Trigger decoder.
    decoder: Arc<dyn TriggerDecoder>,
    /// Task runner (owns the dispatcher).
    runner: TaskRunner,
    /// Duplicate check.
    dedup: Arc<dyn DedupCheck>,
    /// Event sink.
    events: Arc<dyn EventSink>,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Upper bound on the event flush.
    flush_timeout: Duration,
}

impl StepHandler {
    /// Returns the step function name.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Handles one raw trigger.
    pub async fn handle(&self, raw: &[u8]) -> InvocationReport {
        let invocation_id = Uuid::new_v4().to_string();
        let ctx = RequestContext::new(
            self.function.clone(),
            invocation_id.clone(),
            Arc::clone(&self.events),
            Arc::clone(&self.clock),
        );
        let mut errors = Vec::new();

        let trigger = match self.decoder.decode(raw) {
            Ok(trigger) => trigger,
            Err(err) => {
                ctx.log(
                    EVENT_DECODE_ERROR,
                    json!({ "error": err.to_string(), "bytes": raw.len() }),
                );
                errors.push(PipelineError::Decode(err));
                let flush = finish_context(ctx, self.flush_timeout).await;
                return InvocationReport {
                    invocation_id,
                    envelope: None,
                    state: InvocationState::Received,
                    duplicate: false,
                    errors,
                    flush,
                };
            }
        };

        let mut ctx = ctx.with_source(trigger.source.clone());
        ctx.bind(&trigger.envelope);
        ctx.log(
            EVENT_START,
            json!({
                "source": trigger.source,
                "eventId": trigger.event_id,
                "type": trigger.envelope.step,
                "route": trigger.envelope.route,
            }),
        );
        let envelope = trigger.envelope;

        let duplicate = match self.dedup.is_processed_message(&ctx, &envelope).await {
            Ok(processed) => processed,
            Err(err) => {
                ctx.log(EVENT_DEDUP_ERROR, json!({ "error": err.to_string() }));
                errors.push(PipelineError::Dedup(err));
                false
            }
        };

        let (final_envelope, state) = if duplicate {
            ctx.log(EVENT_DUPLICATE_SKIPPED, json!({ "messageId": envelope.message_id() }));
            (envelope, InvocationState::DedupChecked)
        } else {
            let outcome = self.runner.run_task(&ctx, &envelope).await;
            let state = if outcome.publish_failed() {
                InvocationState::TaskRun
            } else {
                InvocationState::Dispatched
            };
            let (dispatched, recovered) = outcome.into_parts();
            errors.extend(recovered);
            if let Err(err) = self.dedup.mark_processed(&ctx, &envelope).await {
                ctx.log(EVENT_DEDUP_ERROR, json!({ "error": err.to_string() }));
                errors.push(PipelineError::Dedup(err));
            }
            (dispatched, state)
        };

        let error_kinds: Vec<&str> = errors.iter().map(PipelineError::kind).collect();
        ctx.log(
            EVENT_RESULT,
            json!({
                "state": state.as_str(),
                "duplicate": duplicate,
                "isDispatched": final_envelope.is_dispatched,
                "type": final_envelope.step,
                "route": final_envelope.route,
                "history": final_envelope.history.len(),
                "errors": error_kinds,
            }),
        );

        let flush = finish_context(ctx, self.flush_timeout).await;
        let state = if flush == FlushStatus::Flushed && state != InvocationState::TaskRun {
            InvocationState::Flushed
        } else {
            state
        };
        InvocationReport {
            invocation_id,
            envelope: Some(final_envelope),
            state,
            duplicate,
            errors,
            flush,
        }
    }
}

impl std::fmt::Debug for StepHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepHandler")
            .field("function", &self.function)
            .field("runner", &self.runner)
            .field("flush_timeout", &self.flush_timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Consumes the context, flushing its sink within `timeout`.
pub(crate) async fn finish_context(ctx: RequestContext, timeout: Duration) -> FlushStatus {
    match tokio::time::timeout(timeout, ctx.finish()).await {
        Ok(Ok(())) => FlushStatus::Flushed,
        Ok(Err(err)) => FlushStatus::Failed(err.to_string()),
        Err(_) => FlushStatus::TimedOut,
    }
}
