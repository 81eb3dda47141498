// crates/sigfox-broker/src/trigger/queue.rs
// ============================================================================
// Module: Sigfox Queue Trigger Decoder
// Description: Decoder for Pub/Sub background-function events.
// Purpose: Extract the base64 envelope, source topic, and event id.
// Dependencies: sigfox-core, base64, serde
// ============================================================================

//! ## Overview
//! Queue triggers arrive as background events:
//! `{"resource": "<topic path>", "eventId": "...", "data": {"data": "<base64>"}}`.
//! A bare Pub/Sub message (`{"data": "<base64>"}`) is also accepted, with the
//! source taken from `attributes.topic` when present.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use sigfox_core::DecodeError;
use sigfox_core::Trigger;
use sigfox_core::TriggerDecoder;

use crate::trigger::enforce_max_bytes;
use crate::trigger::parse_envelope;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Background event wrapper or bare message.
#[derive(Debug, Deserialize)]
struct QueueEvent {
    /// Topic resource that delivered the event.
    #[serde(default)]
    resource: Option<Value>,
    /// Platform event id.
    #[serde(rename = "eventId", default)]
    event_id: Option<String>,
    /// Nested message object, or the base64 data of a bare message.
    data: Value,
    /// Attributes of a bare message.
    #[serde(default)]
    attributes: Option<Map<String, Value>>,
}

// ============================================================================
// SECTION: Decoder
// ============================================================================

/// Decoder for queue-delivered triggers.
#[derive(Debug, Default, Clone, Copy)]
pub struct QueueTriggerDecoder;

impl QueueTriggerDecoder {
    /// Creates a queue trigger decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TriggerDecoder for QueueTriggerDecoder {
    fn decode(&self, raw: &[u8]) -> Result<Trigger, DecodeError> {
        enforce_max_bytes(raw)?;
        let event: QueueEvent =
            serde_json::from_slice(raw).map_err(|err| DecodeError::Malformed(err.to_string()))?;
        let (encoded, attributes) = match &event.data {
            Value::String(encoded) => (encoded.as_str(), event.attributes.as_ref()),
            Value::Object(message) => {
                let encoded = message
                    .get("data")
                    .and_then(Value::as_str)
                    .ok_or_else(|| DecodeError::Malformed("missing data.data".to_string()))?;
                (encoded, message.get("attributes").and_then(Value::as_object))
            }
            _ => return Err(DecodeError::Malformed("data must be a string or object".to_string())),
        };
        let bytes = STANDARD.decode(encoded).map_err(|err| DecodeError::Base64(err.to_string()))?;
        let envelope = parse_envelope(&bytes)?;
        let source = resource_name(event.resource.as_ref()).or_else(|| {
            attributes.and_then(|attrs| attrs.get("topic")).and_then(Value::as_str).map(str::to_string)
        });
        Ok(Trigger {
            envelope,
            source,
            event_id: event.event_id,
        })
    }
}

/// Extracts the resource name from a string or `{ "name": ... }` resource.
fn resource_name(resource: Option<&Value>) -> Option<String> {
    match resource? {
        Value::String(name) => Some(name.clone()),
        Value::Object(object) => object.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}
