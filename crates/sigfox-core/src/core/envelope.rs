// crates/sigfox-core/src/core/envelope.rs
// ============================================================================
// Module: Sigfox Message Envelope
// Description: The message record carried through every pipeline hop.
// Purpose: Define the wire shape of envelopes, routes, and hop records.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! An [`Envelope`] carries the device id, decoded payload, remaining route,
//! and hop history of one Sigfox message. Envelopes are serialized as JSON
//! with the camelCase field names used on the queues (`isDispatched`,
//! `rootTraceId`). Unknown top-level fields are kept in [`Envelope::extra`]
//! so that a hop never drops data added by an upstream producer.
//!
//! Invariants:
//! - `history` is append-only; records are never reordered or rewritten.
//! - [`Route::advance`] never mutates its receiver.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::DeviceId;
use crate::core::identifiers::StepName;
use crate::core::identifiers::TraceId;

// ============================================================================
// SECTION: Route
// ============================================================================

/// Ordered list of step names still to run for a message.
///
/// # Invariants
/// - An empty route means the message is terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(Vec<StepName>);

impl Route {
    /// Creates a route from step names.
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = impl Into<StepName>>) -> Self {
        Self(steps.into_iter().map(Into::into).collect())
    }

    /// Returns an empty route.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Returns true when no steps remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of remaining steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the remaining steps in order.
    #[must_use]
    pub fn steps(&self) -> &[StepName] {
        &self.0
    }

    /// Splits the route into its head and a new route holding the remainder.
    ///
    /// Returns `None` for an empty route. The receiver is left untouched.
    #[must_use]
    pub fn advance(&self) -> Option<(StepName, Self)> {
        let (next, rest) = self.0.split_first()?;
        Some((next.clone(), Self(rest.to_vec())))
    }
}

/// Parses a comma-separated route list such as `"decode, log"`.
///
/// All whitespace is removed before splitting; empty segments are dropped.
#[must_use]
pub fn parse_route_list(raw: &str) -> Route {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    Route::new(compact.split(',').filter(|step| !step.is_empty()))
}

impl From<Vec<StepName>> for Route {
    fn from(steps: Vec<StepName>) -> Self {
        Self(steps)
    }
}

// ============================================================================
// SECTION: Hop Record
// ============================================================================

/// Timing record for one hop through the pipeline.
///
/// # Invariants
/// - `duration` and `latency` are seconds at 0.1 s granularity.
/// - `latency` is `None` for the first hop of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopRecord {
    /// Invocation start time (unix epoch milliseconds).
    pub timestamp: i64,
    /// Time the hop was stamped (unix epoch milliseconds).
    pub end: i64,
    /// Seconds spent inside this invocation.
    pub duration: f64,
    /// Seconds between the previous hop's end and this invocation's start.
    #[serde(default)]
    pub latency: Option<f64>,
    /// Queue topic or request path that delivered the invocation.
    #[serde(default)]
    pub source: Option<String>,
    /// Step function that ran the hop.
    pub function: String,
}

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Message envelope flowing through the pipeline.
///
/// # Invariants
/// - Step handlers own `body` only; routing metadata is owned by the dispatcher.
/// - Once `is_dispatched` is true the envelope is never published again by
///   the invocation holding it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Originating device identifier.
    #[serde(default)]
    pub device: Option<DeviceId>,
    /// Current or target step name.
    #[serde(rename = "type", default)]
    pub step: Option<StepName>,
    /// Decoded payload fields.
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Map<String, Value>,
    /// Steps still to run.
    #[serde(default, deserialize_with = "null_as_default")]
    pub route: Route,
    /// Hop timing records, earliest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<HopRecord>,
    /// True when this copy has already been published onward.
    #[serde(rename = "isDispatched", default, deserialize_with = "null_as_default")]
    pub is_dispatched: bool,
    /// Correlation token shared by every hop of the message.
    #[serde(rename = "rootTraceId", default)]
    pub root_trace_id: Option<TraceId>,
    /// Unknown top-level fields preserved across hops.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Envelope {
    /// Creates an envelope for a device with the given body.
    #[must_use]
    pub fn new(device: Option<DeviceId>, body: Map<String, Value>) -> Self {
        Self {
            device,
            body,
            ..Self::default()
        }
    }

    /// Returns the most recent hop record, if any.
    #[must_use]
    pub fn last_hop(&self) -> Option<&HopRecord> {
        self.history.last()
    }

    /// Returns the message identity used for duplicate detection.
    ///
    /// Prefers the `uuid` body field assigned at ingestion and falls back to
    /// the root trace id.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.body
            .get("uuid")
            .and_then(Value::as_str)
            .or_else(|| self.root_trace_id.as_ref().map(TraceId::as_str))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Deserializes `null` as the type's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
