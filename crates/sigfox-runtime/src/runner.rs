// crates/sigfox-runtime/src/runner.rs
// ============================================================================
// Module: Sigfox Task Runner
// Description: Runs one step task and always dispatches afterwards.
// Purpose: Isolate step failures from route advancement.
// Dependencies: sigfox-core, serde_json
// ============================================================================

//! ## Overview
//! [`TaskRunner::run_task`] calls the step's [`StepTask`], adopts the fields a
//! step is allowed to change, and hands the result to the [`Dispatcher`].
//! A task failure is logged and the original envelope is dispatched instead.
//! Invariants:
//! - Only `body` is taken from the task result, plus `route` when the input
//!   route was empty.
//! - `device`, `type`, `history`, `isDispatched`, `rootTraceId`, and unknown
//!   top-level fields always come from the input envelope.
//! - The dispatcher runs exactly once per call.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::json;
use sigfox_core::Envelope;
use sigfox_core::Outcome;
use sigfox_core::RequestContext;
use sigfox_core::StepTask;
use sigfox_core::events::EVENT_ROUTE_IGNORED;
use sigfox_core::events::EVENT_TASK;
use sigfox_core::events::EVENT_TASK_ERROR;

use crate::dispatcher::Dispatcher;

// ============================================================================
// SECTION: Task Runner
// ============================================================================

/// Runs a step task, then dispatches.
#[derive(Clone)]
pub struct TaskRunner {
    /// Step business logic.
    task: Arc<dyn StepTask>,
    /// Dispatcher invoked after the task.
    dispatcher: Dispatcher,
}

impl TaskRunner {
    /// Creates a runner for `task` that dispatches through `dispatcher`.
    #[must_use]
    pub fn new(task: Arc<dyn StepTask>, dispatcher: Dispatcher) -> Self {
        Self {
            task,
            dispatcher,
        }
    }

    /// Returns the dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Runs the task and dispatches the resulting envelope.
    ///
    /// A task failure is reported as [`Outcome::Failed`] carrying the
    /// dispatched envelope, with the task error ahead of any publish error.
    /// When the task succeeds the dispatch outcome is returned as is.
    pub async fn run_task(&self, ctx: &RequestContext, envelope: &Envelope) -> Outcome {
        let result =
            self.task.run(ctx, envelope.device.as_ref(), &envelope.body, envelope).await;
        match result {
            Ok(updated) => {
                let adopted = adopt_task_result(ctx, envelope, updated);
                ctx.log(
                    EVENT_TASK,
                    json!({ "body": adopted.body, "route": adopted.route }),
                );
                self.dispatcher.dispatch(ctx, &adopted).await
            }
            Err(err) => {
                ctx.log(EVENT_TASK_ERROR, json!({ "error": err.to_string() }));
                self.dispatcher.dispatch(ctx, envelope).await.with_prior_error(err)
            }
        }
    }
}

impl std::fmt::Debug for TaskRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRunner").field("dispatcher", &self.dispatcher).finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Merges the step-owned fields of `updated` into a copy of `input`.
fn adopt_task_result(ctx: &RequestContext, input: &Envelope, updated: Envelope) -> Envelope {
    let mut adopted = input.clone();
    adopted.body = updated.body;
    if updated.route != input.route {
        if input.route.is_empty() {
            adopted.route = updated.route;
        } else {
            ctx.log(
                EVENT_ROUTE_IGNORED,
                json!({ "route": input.route, "attempted": updated.route }),
            );
        }
    }
    adopted
}
