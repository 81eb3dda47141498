// crates/sigfox-broker/tests/publishers/callback_tests.rs
// ============================================================================
// Module: CallbackPublisher Tests
// Description: Tests for the closure-backed publisher.
// Purpose: Validate handler invocation and error propagation.
// Dependencies: sigfox-broker, sigfox-core
// ============================================================================

//! ## Overview
//! Exercises [`sigfox_broker::CallbackPublisher`].

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

use std::sync::Arc;
use std::sync::Mutex;

use serde_json::json;
use sigfox_broker::CallbackPublisher;
use sigfox_core::PublishError;
use sigfox_core::PublishReceipt;
use sigfox_core::Publisher;
use sigfox_core::TopicName;

/// Verifies the handler sees each topic in order.
#[tokio::test]
async fn callback_receives_topic_and_payload() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let publisher = CallbackPublisher::new(move |topic, payload| {
        sink.lock().unwrap().push((topic.to_string(), payload.clone()));
        Ok(PublishReceipt {
            message_id: "cb".to_string(),
            topic: topic.clone(),
        })
    });
    publisher.publish(&TopicName::all(), &json!({"n": 1})).await.expect("publish");
    publisher.publish(&TopicName::missing_device(), &json!({"n": 2})).await.expect("publish");
    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], ("sigfox.devices.all".to_string(), json!({"n": 1})));
    assert_eq!(seen[1].0, "sigfox.devices.missing_device");
}

/// Verifies handler errors are returned unchanged.
#[tokio::test]
async fn callback_error_is_returned() {
    let publisher =
        CallbackPublisher::new(|topic, _| Err(PublishError::TopicMissing(topic.to_string())));
    let err = publisher.publish(&TopicName::all(), &json!({})).await.expect_err("error");
    assert!(matches!(err, PublishError::TopicMissing(name) if name == "sigfox.devices.all"));
}
