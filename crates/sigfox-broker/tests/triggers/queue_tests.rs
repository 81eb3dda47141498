// crates/sigfox-broker/tests/triggers/queue_tests.rs
// ============================================================================
// Module: QueueTriggerDecoder Tests
// Description: Tests for Pub/Sub background event decoding.
// Purpose: Validate envelope, source, and event id extraction.
// Dependencies: sigfox-broker, sigfox-core, base64
// ============================================================================

//! ## Overview
//! Exercises [`sigfox_broker::QueueTriggerDecoder`].

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

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;
use sigfox_broker::QueueTriggerDecoder;
use sigfox_core::DecodeError;
use sigfox_core::TriggerDecoder;

use super::common::sample_envelope;

/// Verifies a background event yields envelope, source, and event id.
#[test]
fn background_event_decodes_envelope() {
    let envelope = sample_envelope();
    let data = STANDARD.encode(serde_json::to_vec(&envelope).unwrap());
    let event = json!({
        "eventType": "providers/cloud.pubsub/eventTypes/topic.publish",
        "resource": "projects/myproject/topics/sigfox.types.decodeStructuredMessage",
        "timestamp": "2017-05-07T14:30:53.014Z",
        "data": {"attributes": {}, "data": data},
        "eventId": "121025758478243",
    });
    let trigger = QueueTriggerDecoder::new().decode(event.to_string().as_bytes()).expect("decode");
    assert_eq!(trigger.envelope, envelope);
    assert_eq!(trigger.source.as_deref(), Some("projects/myproject/topics/sigfox.types.decodeStructuredMessage"));
    assert_eq!(trigger.event_id.as_deref(), Some("121025758478243"));
}

/// Verifies a bare message with a topic attribute is accepted.
#[test]
fn bare_message_uses_topic_attribute() {
    let data = STANDARD.encode(br#"{"device":"2c30eb","route":["log"]}"#);
    let message = json!({"data": data, "attributes": {"topic": "sigfox.devices.all"}});
    let trigger = QueueTriggerDecoder::new().decode(message.to_string().as_bytes()).expect("decode");
    assert_eq!(trigger.envelope.device.unwrap().as_str(), "2C30EB");
    assert_eq!(trigger.source.as_deref(), Some("sigfox.devices.all"));
    assert_eq!(trigger.event_id, None);
}

/// Verifies malformed triggers map to distinct errors.
#[test]
fn malformed_triggers_are_rejected() {
    let decoder = QueueTriggerDecoder::new();
    assert!(matches!(decoder.decode(b"not json"), Err(DecodeError::Malformed(_))));
    assert!(matches!(decoder.decode(br#"{"data": 7}"#), Err(DecodeError::Malformed(_))));
    assert!(matches!(decoder.decode(br#"{"data": {"data": "%%%"}}"#), Err(DecodeError::Base64(_))));
    let not_envelope = STANDARD.encode(b"[1,2,3]");
    let raw = json!({"data": {"data": not_envelope}}).to_string();
    assert!(matches!(decoder.decode(raw.as_bytes()), Err(DecodeError::Envelope(_))));
}
