// crates/sigfox-broker/tests/triggers/http_tests.rs
// ============================================================================
// Module: HttpTriggerDecoder Tests
// Description: Tests for HTTP body decoding.
// Purpose: Validate direct envelope parsing and configured source.
// Dependencies: sigfox-broker, sigfox-core
// ============================================================================

//! ## Overview
//! Exercises [`sigfox_broker::HttpTriggerDecoder`].

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use sigfox_broker::HttpTriggerDecoder;
use sigfox_core::DecodeError;
use sigfox_core::TriggerDecoder;

use super::common::sample_envelope;

/// Verifies the request body is parsed as the envelope.
#[test]
fn http_body_is_envelope() {
    let envelope = sample_envelope();
    let decoder = HttpTriggerDecoder::new(Some("/routeMessage".to_string()));
    let trigger = decoder.decode(&serde_json::to_vec(&envelope).unwrap()).expect("decode");
    assert_eq!(trigger.envelope, envelope);
    assert_eq!(trigger.source.as_deref(), Some("/routeMessage"));
}

/// Verifies empty and non-object bodies are rejected.
#[test]
fn http_rejects_empty_and_invalid_bodies() {
    let decoder = HttpTriggerDecoder::default();
    assert!(matches!(decoder.decode(b"  \n"), Err(DecodeError::Malformed(_))));
    assert!(matches!(decoder.decode(b"\"text\""), Err(DecodeError::Envelope(_))));
}
