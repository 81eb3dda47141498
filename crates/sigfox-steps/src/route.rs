// crates/sigfox-steps/src/route.rs
// ============================================================================
// Module: Route Message Step
// Description: Step task assigning a device's processing route.
// Purpose: Attach the list of remaining steps to freshly received messages.
// Dependencies: sigfox-core, serde_json
// ============================================================================

//! ## Overview
//! [`RouteMessage`] looks up the route for the message's device and stores a
//! fresh copy on the envelope. Lookup failures surface as
//! [`TaskError::Dependency`], which the task runner logs before dispatching
//! the unrouted message (and so terminating it).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use sigfox_core::DeviceId;
use sigfox_core::Envelope;
use sigfox_core::RequestContext;
use sigfox_core::RouteLookup;
use sigfox_core::StepTask;
use sigfox_core::TaskError;
use sigfox_core::events::EVENT_ROUTE_LOOKUP;
use sigfox_core::events::EVENT_ROUTE_LOOKUP_ERROR;

// ============================================================================
// SECTION: Step
// ============================================================================

/// Step name under which this task is deployed.
pub const ROUTE_MESSAGE: &str = "routeMessage";

/// Assigns routes from a [`RouteLookup`].
#[derive(Clone)]
pub struct RouteMessage {
    /// Route lookup consulted per message.
    routes: Arc<dyn RouteLookup>,
}

impl RouteMessage {
    /// Creates the step over `routes`.
    #[must_use]
    pub fn new(routes: Arc<dyn RouteLookup>) -> Self {
        Self {
            routes,
        }
    }
}

#[async_trait]
impl StepTask for RouteMessage {
    async fn run(
        &self,
        ctx: &RequestContext,
        device: Option<&DeviceId>,
        _body: &Map<String, Value>,
        envelope: &Envelope,
    ) -> Result<Envelope, TaskError> {
        match self.routes.lookup_route(device).await {
            Ok(route) => {
                ctx.log(EVENT_ROUTE_LOOKUP, json!({ "route": route }));
                let mut updated = envelope.clone();
                updated.route = route;
                Ok(updated)
            }
            Err(err) => {
                ctx.log(EVENT_ROUTE_LOOKUP_ERROR, json!({ "error": err.to_string() }));
                Err(err.into())
            }
        }
    }
}

impl std::fmt::Debug for RouteMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteMessage").finish_non_exhaustive()
    }
}
