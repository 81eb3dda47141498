// crates/sigfox-steps/src/builtin.rs
// ============================================================================
// Module: Built-in Steps
// Description: Name-addressable registry of the bundled step tasks.
// Purpose: Let deployments select a step task by its function name.
// Dependencies: sigfox-core
// ============================================================================

//! ## Overview
//! [`BuiltinStep`] names every step task shipped with the pipeline and builds
//! it from [`StepDependencies`]. Step names match the queue names used in
//! routes (`sigfox.types.<name>`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;
use sigfox_core::DeviceId;
use sigfox_core::Envelope;
use sigfox_core::RequestContext;
use sigfox_core::RouteLookup;
use sigfox_core::StepTask;
use sigfox_core::TaskError;
use thiserror::Error;

use crate::decode::DECODE_STRUCTURED_MESSAGE;
use crate::decode::DecodeStructuredMessage;
use crate::route::ROUTE_MESSAGE;
use crate::route::RouteMessage;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Built-in step selection errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    /// No built-in step has this name.
    #[error("unknown step: {0}")]
    UnknownStep(String),
    /// The step needs a route lookup and none was supplied.
    #[error("step {0} requires a route lookup")]
    MissingRouteLookup(String),
}

// ============================================================================
// SECTION: Pass-Through Step
// ============================================================================

/// Step name of the pass-through task.
pub const PASS_THROUGH: &str = "passThrough";

/// Step that forwards the envelope unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

#[async_trait]
impl StepTask for PassThrough {
    async fn run(
        &self,
        _ctx: &RequestContext,
        _device: Option<&DeviceId>,
        _body: &Map<String, Value>,
        envelope: &Envelope,
    ) -> Result<Envelope, TaskError> {
        Ok(envelope.clone())
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Collaborators a built-in step may need.
#[derive(Clone, Default)]
pub struct StepDependencies {
    /// Field names the structured decoder treats as text.
    pub text_fields: Vec<String>,
    /// Route lookup for the routing step.
    pub routes: Option<Arc<dyn RouteLookup>>,
}

impl fmt::Debug for StepDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDependencies")
            .field("text_fields", &self.text_fields)
            .field("routes", &self.routes.is_some())
            .finish()
    }
}

/// Step tasks bundled with the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinStep {
    /// Structured payload decoder.
    DecodeStructuredMessage,
    /// Route assignment.
    RouteMessage,
    /// Unchanged forwarding.
    PassThrough,
}

impl BuiltinStep {
    /// Every built-in step.
    pub const ALL: [Self; 3] = [Self::DecodeStructuredMessage, Self::RouteMessage, Self::PassThrough];

    /// Returns the step's function name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DecodeStructuredMessage => DECODE_STRUCTURED_MESSAGE,
            Self::RouteMessage => ROUTE_MESSAGE,
            Self::PassThrough => PASS_THROUGH,
        }
    }

    /// Builds the step task.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::MissingRouteLookup`] when building
    /// [`BuiltinStep::RouteMessage`] without a route lookup.
    pub fn build(self, deps: &StepDependencies) -> Result<Arc<dyn StepTask>, StepError> {
        match self {
            Self::DecodeStructuredMessage => {
                Ok(Arc::new(DecodeStructuredMessage::new(deps.text_fields.iter().cloned())))
            }
            Self::RouteMessage => deps
                .routes
                .as_ref()
                .map(|routes| Arc::new(RouteMessage::new(Arc::clone(routes))) as Arc<dyn StepTask>)
                .ok_or_else(|| StepError::MissingRouteLookup(self.name().to_string())),
            Self::PassThrough => Ok(Arc::new(PassThrough)),
        }
    }
}

impl fmt::Display for BuiltinStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BuiltinStep {
    type Err = StepError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.name() == name)
            .ok_or_else(|| StepError::UnknownStep(name.to_string()))
    }
}
