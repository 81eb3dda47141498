// crates/sigfox-core/src/runtime/payload.rs
// ============================================================================
// Module: Sigfox Published Payload
// Description: JSON encoding of envelopes for the queue transport.
// Purpose: Produce the exact JSON object published to the next step.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! Envelopes are published as JSON objects. When `unpack_body` is enabled the
//! body fields are promoted to the root object for consumers that expect a
//! flat record. Envelope fields win over body fields of the same name and the
//! `body` key is dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::Envelope;
use crate::interfaces::PublishError;

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Key holding the envelope body.
const BODY_KEY: &str = "body";

/// Encodes an envelope as the JSON value published to a queue.
///
/// # Errors
///
/// Returns [`PublishError::Encode`] when the envelope cannot be serialized.
pub fn encode_published_payload(envelope: &Envelope, unpack_body: bool) -> Result<Value, PublishError> {
    let value = serde_json::to_value(envelope).map_err(|err| PublishError::Encode(err.to_string()))?;
    if !unpack_body {
        return Ok(value);
    }
    let Value::Object(mut root) = value else {
        return Err(PublishError::Encode("envelope did not encode as an object".to_string()));
    };
    let body = match root.remove(BODY_KEY) {
        Some(Value::Object(body)) => body,
        _ => Map::new(),
    };
    let mut flat = body;
    flat.extend(root);
    Ok(Value::Object(flat))
}
