// crates/sigfox-runtime/src/dispatcher.rs
// ============================================================================
// Module: Sigfox Dispatcher
// Description: Route advancement and publish to the next step's queue.
// Purpose: Move a message one hop forward at most once per invocation.
// Dependencies: sigfox-core, serde_json
// ============================================================================

//! ## Overview
//! [`Dispatcher::dispatch`] stamps the envelope with a hop record, pops the
//! head of its route into `type`, and publishes the result to
//! `sigfox.types.<next>`. An empty route terminates the message.
//! Invariants:
//! - An envelope with `isDispatched = true` is returned unchanged with zero publishes.
//! - At most one publish call per dispatch.
//! - The published copy carries `isDispatched = false`; the returned copy
//!   carries `isDispatched = true` whether or not the publish succeeded.
//! - The input route is never mutated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::json;
use sigfox_core::Envelope;
use sigfox_core::HistoryTracker;
use sigfox_core::Outcome;
use sigfox_core::Publisher;
use sigfox_core::RequestContext;
use sigfox_core::TopicName;
use sigfox_core::encode_published_payload;
use sigfox_core::events::EVENT_DISPATCH;
use sigfox_core::events::EVENT_DISPATCH_ERROR;
use sigfox_core::events::EVENT_NO_ROUTE;
use sigfox_core::events::EVENT_SKIP_DISPATCHED;

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Publishes envelopes to the next step of their route.
#[derive(Clone)]
pub struct Dispatcher {
    /// Queue transport.
    publisher: Arc<dyn Publisher>,
    /// Hop stamper for this step function.
    history: HistoryTracker,
    /// Promote body fields to the root of the published JSON.
    unpack_body: bool,
}

impl Dispatcher {
    /// Creates a dispatcher publishing through `publisher`.
    #[must_use]
    pub fn new(publisher: Arc<dyn Publisher>, history: HistoryTracker) -> Self {
        Self {
            publisher,
            history,
            unpack_body: false,
        }
    }

    /// Enables or disables body unpacking on published payloads.
    #[must_use]
    pub const fn with_unpack_body(mut self, unpack_body: bool) -> Self {
        self.unpack_body = unpack_body;
        self
    }

    /// Returns the hop stamper.
    #[must_use]
    pub const fn history(&self) -> &HistoryTracker {
        &self.history
    }

    /// Dispatches `envelope` to the next step of its route.
    ///
    /// Publish failures are recovered and reported as [`Outcome::Failed`].
    pub async fn dispatch(&self, ctx: &RequestContext, envelope: &Envelope) -> Outcome {
        if envelope.is_dispatched {
            ctx.log(EVENT_SKIP_DISPATCHED, json!({ "type": envelope.step }));
            return Outcome::Ok(envelope.clone());
        }

        let stamped = self.history.record_hop(envelope, ctx.started_at(), ctx.source());
        let Some((next, rest)) = stamped.route.advance() else {
            ctx.log(EVENT_NO_ROUTE, json!({ "history": stamped.history.len() }));
            return Outcome::Ok(stamped);
        };

        let topic = TopicName::for_type(&next);
        let mut outgoing = stamped;
        outgoing.step = Some(next);
        outgoing.route = rest;
        outgoing.is_dispatched = false;

        let published = match encode_published_payload(&outgoing, self.unpack_body) {
            Ok(payload) => self.publisher.publish(&topic, &payload).await,
            Err(err) => Err(err),
        };

        let mut sent = outgoing;
        sent.is_dispatched = true;
        match published {
            Ok(receipt) => {
                ctx.log(
                    EVENT_DISPATCH,
                    json!({
                        "topic": topic.as_str(),
                        "message_id": receipt.message_id,
                        "type": sent.step,
                        "route": sent.route,
                    }),
                );
                Outcome::Ok(sent)
            }
            Err(err) => {
                ctx.log(
                    EVENT_DISPATCH_ERROR,
                    json!({ "topic": topic.as_str(), "error": err.to_string() }),
                );
                Outcome::failed(sent, err)
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("history", &self.history)
            .field("unpack_body", &self.unpack_body)
            .finish_non_exhaustive()
    }
}
