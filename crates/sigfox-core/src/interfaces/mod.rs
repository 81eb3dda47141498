// crates/sigfox-core/src/interfaces/mod.rs
// ============================================================================
// Module: Sigfox Pipeline Interfaces
// Description: Collaborator contracts consumed by the dispatch engine.
// Purpose: Keep queue transport, routing, dedup, logging, and step logic pluggable.
// Dependencies: async-trait, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The dispatch engine talks to the outside world only through the traits in
//! this module. Transport-specific implementations live in `sigfox-broker`;
//! pipeline wiring lives in `sigfox-runtime`.
//!
//! Every collaborator may suspend (network I/O) except [`TriggerDecoder`],
//! [`SeenMessageStore`], and [`EventSink::record`], which are synchronous.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::DeviceId;
use crate::core::Envelope;
use crate::core::PipelineEvent;
use crate::core::Route;
use crate::core::TopicName;
use crate::runtime::RequestContext;

// ============================================================================
// SECTION: Queue Publisher
// ============================================================================

/// Receipt returned by a publisher after a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Transport-assigned message identifier.
    pub message_id: String,
    /// Topic the message was published to.
    pub topic: TopicName,
}

/// Queue publish errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Payload could not be encoded for the transport.
    #[error("publish encode failure: {0}")]
    Encode(String),
    /// Transport rejected or failed to deliver the message.
    #[error("publish delivery failure: {0}")]
    Delivery(String),
    /// Topic does not exist on the transport.
    #[error("publish topic missing: {0}")]
    TopicMissing(String),
}

/// Durable pub/sub transport keyed by topic name.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes a JSON payload to a topic.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the message cannot be delivered.
    async fn publish(
        &self,
        topic: &TopicName,
        payload: &Value,
    ) -> Result<PublishReceipt, PublishError>;
}

// ============================================================================
// SECTION: Trigger Decoder
// ============================================================================

/// Decoded trigger event.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    /// Envelope carried by the trigger.
    pub envelope: Envelope,
    /// Queue topic or request path that delivered the trigger.
    pub source: Option<String>,
    /// Platform event identifier, when provided.
    pub event_id: Option<String>,
}

/// Trigger decode errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Trigger is not valid JSON or lacks required fields.
    #[error("trigger malformed: {0}")]
    Malformed(String),
    /// Embedded base64 data could not be decoded.
    #[error("trigger base64 failure: {0}")]
    Base64(String),
    /// Embedded envelope is not a valid envelope.
    #[error("trigger envelope invalid: {0}")]
    Envelope(String),
    /// Trigger exceeded the configured size limit.
    #[error("trigger exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual trigger size in bytes.
        actual_bytes: usize,
    },
}

/// Transport-specific decoder turning a raw trigger into an envelope.
pub trait TriggerDecoder: Send + Sync {
    /// Decodes raw trigger bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the trigger is malformed.
    fn decode(&self, raw: &[u8]) -> Result<Trigger, DecodeError>;
}

// ============================================================================
// SECTION: Route Lookup
// ============================================================================

/// Route lookup errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, Error)]
pub enum RouteLookupError {
    /// Route source could not be reached.
    #[error("route source unavailable: {0}")]
    Unavailable(String),
    /// Route source returned an unusable route.
    #[error("route invalid: {0}")]
    Invalid(String),
    /// No route is configured for the device.
    #[error("no route for device: {0}")]
    NotFound(String),
}

/// Routing-table collaborator mapping devices to step sequences.
#[async_trait]
pub trait RouteLookup: Send + Sync {
    /// Returns the route for a device.
    ///
    /// # Errors
    ///
    /// Returns [`RouteLookupError`] when no route can be produced.
    async fn lookup_route(&self, device: Option<&DeviceId>) -> Result<Route, RouteLookupError>;
}

/// Uncached origin of routes, such as a remote metadata attribute.
#[async_trait]
pub trait RouteSource: Send + Sync {
    /// Fetches the current route for a device from the origin.
    ///
    /// # Errors
    ///
    /// Returns [`RouteLookupError`] when the origin cannot be read.
    async fn fetch_route(&self, device: Option<&DeviceId>) -> Result<Route, RouteLookupError>;

    /// Returns false when the origin serves one route for every device.
    ///
    /// Caches key project-wide sources under a single entry.
    fn is_device_scoped(&self) -> bool {
        true
    }
}

// ============================================================================
// SECTION: Duplicate Detection
// ============================================================================

/// Duplicate detection errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DedupError {
    /// Backing store failed.
    #[error("dedup store failure: {0}")]
    Store(String),
}

/// Record of recently seen message identifiers.
pub trait SeenMessageStore: Send + Sync {
    /// Returns true when `id` was marked seen and has not expired.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError`] when the store cannot be read.
    fn seen(&self, id: &str) -> Result<bool, DedupError>;

    /// Marks `id` as seen.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError`] when the store cannot be written.
    fn mark_seen(&self, id: &str) -> Result<(), DedupError>;
}

/// Duplicate-delivery check consulted before running a step.
#[async_trait]
pub trait DedupCheck: Send + Sync {
    /// Returns true when this step already processed the message.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError`] when the check cannot be performed.
    async fn is_processed_message(
        &self,
        ctx: &RequestContext,
        envelope: &Envelope,
    ) -> Result<bool, DedupError>;

    /// Records that this step processed the message.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError`] when the record cannot be stored.
    async fn mark_processed(&self, ctx: &RequestContext, envelope: &Envelope)
    -> Result<(), DedupError>;
}

/// Conservative dedup stub that never reports a duplicate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverProcessed;

#[async_trait]
impl DedupCheck for NeverProcessed {
    async fn is_processed_message(
        &self,
        _ctx: &RequestContext,
        _envelope: &Envelope,
    ) -> Result<bool, DedupError> {
        Ok(false)
    }

    async fn mark_processed(
        &self,
        _ctx: &RequestContext,
        _envelope: &Envelope,
    ) -> Result<(), DedupError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Step Task
// ============================================================================

/// Step task errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Step business logic failed.
    #[error("task failed: {0}")]
    Failed(String),
    /// A collaborator used by the step failed.
    #[error("task dependency failed: {0}")]
    Dependency(String),
}

impl From<RouteLookupError> for TaskError {
    fn from(err: RouteLookupError) -> Self {
        Self::Dependency(err.to_string())
    }
}

/// Pluggable business logic for one pipeline stage.
///
/// Implementations must be safe to run more than once for the same message.
#[async_trait]
pub trait StepTask: Send + Sync {
    /// Runs the step and returns the updated envelope.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError`] when the step fails.
    async fn run(
        &self,
        ctx: &RequestContext,
        device: Option<&DeviceId>,
        body: &Map<String, Value>,
        envelope: &Envelope,
    ) -> Result<Envelope, TaskError>;
}

// ============================================================================
// SECTION: Event Sink
// ============================================================================

/// Event sink errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum EventSinkError {
    /// Sink failed to write buffered events.
    #[error("event sink write failed: {0}")]
    Write(String),
}

/// Observability sink for pipeline events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Records an event. Never fails from the caller's point of view.
    fn record(&self, event: &PipelineEvent);

    /// Flushes buffered events.
    ///
    /// # Errors
    ///
    /// Returns [`EventSinkError`] when buffered events cannot be written.
    async fn flush(&self) -> Result<(), EventSinkError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Pipeline Errors
// ============================================================================

/// Error carried by a failed outcome.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Trigger decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Step task failed.
    #[error(transparent)]
    Task(#[from] TaskError),
    /// Publishing failed.
    #[error(transparent)]
    Publish(#[from] PublishError),
    /// Duplicate check failed.
    #[error(transparent)]
    Dedup(#[from] DedupError),
}

impl PipelineError {
    /// Returns a stable label for the error category.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Task(_) => "task",
            Self::Publish(_) => "publish",
            Self::Dedup(_) => "dedup",
        }
    }
}
