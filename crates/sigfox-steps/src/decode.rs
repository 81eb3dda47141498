// crates/sigfox-steps/src/decode.rs
// ============================================================================
// Module: Decode Structured Message Step
// Description: Step task expanding `body.data` into sensor fields.
// Purpose: Make structured sensor readings available to later steps.
// Dependencies: sigfox-core, serde_json
// ============================================================================

//! ## Overview
//! [`DecodeStructuredMessage`] decodes the hex payload in `body.data` with
//! [`decode_message`] and merges the resulting fields into the body. A payload
//! that fails to decode is logged and the body is passed on unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use sigfox_core::DeviceId;
use sigfox_core::Envelope;
use sigfox_core::RequestContext;
use sigfox_core::StepTask;
use sigfox_core::TaskError;
use sigfox_core::events::EVENT_DECODE_PAYLOAD;
use sigfox_core::events::EVENT_DECODE_PAYLOAD_ERROR;

use crate::structured::decode_message;

// ============================================================================
// SECTION: Step
// ============================================================================

/// Step name under which this task is deployed.
pub const DECODE_STRUCTURED_MESSAGE: &str = "decodeStructuredMessage";

/// Decodes structured sensor payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStructuredMessage {
    /// Field names decoded as text rather than numbers.
    text_fields: Vec<String>,
}

impl DecodeStructuredMessage {
    /// Creates a decoder treating `text_fields` as text.
    #[must_use]
    pub fn new(text_fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            text_fields: text_fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the configured text fields.
    #[must_use]
    pub fn text_fields(&self) -> &[String] {
        &self.text_fields
    }
}

#[async_trait]
impl StepTask for DecodeStructuredMessage {
    async fn run(
        &self,
        ctx: &RequestContext,
        _device: Option<&DeviceId>,
        body: &Map<String, Value>,
        envelope: &Envelope,
    ) -> Result<Envelope, TaskError> {
        let mut updated = envelope.clone();
        let Some(data) = body.get("data").and_then(Value::as_str).filter(|data| !data.is_empty())
        else {
            return Ok(updated);
        };
        match decode_message(data, &self.text_fields) {
            Ok(fields) => {
                ctx.log(EVENT_DECODE_PAYLOAD, json!({ "data": data, "fields": fields }));
                let mut merged = body.clone();
                merged.extend(fields);
                updated.body = merged;
            }
            Err(err) => {
                ctx.log(EVENT_DECODE_PAYLOAD_ERROR, json!({ "data": data, "error": err.to_string() }));
                updated.body = body.clone();
            }
        }
        Ok(updated)
    }
}
