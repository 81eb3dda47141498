// crates/sigfox-broker/src/trigger/mod.rs
// ============================================================================
// Module: Sigfox Trigger Decoders
// Description: Queue and HTTP trigger decoders.
// Purpose: Turn raw platform trigger bytes into envelopes.
// Dependencies: sigfox-core, serde_json
// ============================================================================

//! ## Overview
//! A step is invoked either by a queue message ([`QueueTriggerDecoder`]) or
//! by an HTTP request ([`HttpTriggerDecoder`]). Both implement
//! [`sigfox_core::TriggerDecoder`] and reject triggers larger than
//! [`MAX_TRIGGER_BYTES`] before parsing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sigfox_core::DecodeError;
use sigfox_core::Envelope;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum accepted trigger size in bytes.
pub const MAX_TRIGGER_BYTES: usize = 10 * 1024 * 1024;

/// Fails when `raw` exceeds [`MAX_TRIGGER_BYTES`].
pub(crate) fn enforce_max_bytes(raw: &[u8]) -> Result<(), DecodeError> {
    if raw.len() > MAX_TRIGGER_BYTES {
        return Err(DecodeError::TooLarge {
            max_bytes: MAX_TRIGGER_BYTES,
            actual_bytes: raw.len(),
        });
    }
    Ok(())
}

/// Parses envelope JSON bytes.
pub(crate) fn parse_envelope(bytes: &[u8]) -> Result<Envelope, DecodeError> {
    serde_json::from_slice(bytes).map_err(|err| DecodeError::Envelope(err.to_string()))
}

// ============================================================================
// SECTION: Implementations
// ============================================================================

pub mod http;
pub mod queue;

pub use http::HttpTriggerDecoder;
pub use queue::QueueTriggerDecoder;
