// crates/sigfox-broker/src/trigger/http.rs
// ============================================================================
// Module: Sigfox HTTP Trigger Decoder
// Description: Decoder for HTTP-invoked steps.
// Purpose: Parse a JSON request body directly as an envelope.
// Dependencies: sigfox-core
// ============================================================================

//! ## Overview
//! HTTP triggers carry the envelope as the raw JSON request body. The request
//! path is configured on the decoder and reported as the trigger source.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sigfox_core::DecodeError;
use sigfox_core::Trigger;
use sigfox_core::TriggerDecoder;

use crate::trigger::enforce_max_bytes;
use crate::trigger::parse_envelope;

// ============================================================================
// SECTION: Decoder
// ============================================================================

/// Decoder for HTTP-delivered triggers.
#[derive(Debug, Default, Clone)]
pub struct HttpTriggerDecoder {
    /// Request path reported as the trigger source.
    path: Option<String>,
}

impl HttpTriggerDecoder {
    /// Creates a decoder reporting `path` as the trigger source.
    #[must_use]
    pub fn new(path: Option<String>) -> Self {
        Self {
            path,
        }
    }
}

impl TriggerDecoder for HttpTriggerDecoder {
    fn decode(&self, raw: &[u8]) -> Result<Trigger, DecodeError> {
        enforce_max_bytes(raw)?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Err(DecodeError::Malformed("empty request body".to_string()));
        }
        Ok(Trigger {
            envelope: parse_envelope(raw)?,
            source: self.path.clone(),
            event_id: None,
        })
    }
}
